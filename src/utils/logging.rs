use crate::error::{AppError, AppResult};
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;

/// 初始化会话日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n文档分析会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 向会话日志文件追加一行（带时间戳）
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )
    .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base_url`: 分析服务地址
/// - `timeout_secs`: 请求超时
pub fn log_startup(api_base_url: &str, timeout_secs: Option<u64>) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档上传与分析");
    info!("🌐 分析服务: {}", api_base_url);
    match timeout_secs {
        Some(secs) => info!("⏱️ 请求超时: {} 秒", secs),
        None => info!("⏱️ 请求超时: 不限（一直等待）"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `file_count`: 本批文件数
pub fn log_batch_start(batch_num: usize, file_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始上传第 {} 批", batch_num);
    info!("📄 本批文件: {} 个", file_count);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `registered`: 本批登记的文档数
/// - `total`: 登记后的文档总数
pub fn log_batch_complete(batch_num: usize, registered: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 登记 {} 个文档，共 {} 个",
        batch_num, registered, total
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `documents`: 已登记文档数
/// - `files_processed`: 服务端处理的文件数（分析失败时为 `None`）
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(documents: usize, files_processed: Option<u32>, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📁 已登记文档: {}", documents);
    match files_processed {
        Some(n) => info!("✅ 分析完成: 处理 {} 个文件", n),
        None => info!("❌ 未得到分析结果"),
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("高血压病史", 2), "高血...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn log_file_gets_header_then_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_log_line(path, "registered report.pdf").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("文档分析会话日志"));
        assert!(content.trim_end().ends_with("registered report.pdf"));
    }
}
