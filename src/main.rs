use anyhow::{Context, Result};
use emr_intake::{logger, App, Config};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：INTAKE_CONFIG 指定的 TOML 文件 + 环境变量覆盖
    let config = match std::env::var("INTAKE_CONFIG") {
        Ok(path) => Config::load(&path)
            .with_context(|| format!("无法加载配置文件: {}", path))?
            .with_env(),
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logger::init_with_verbosity(config.verbose_logging);

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("用法: emr_intake <file.pdf>...");
    }

    // 初始化并运行应用
    App::initialize(config).await?.run(&paths).await?;

    Ok(())
}
