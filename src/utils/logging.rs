use tracing::info;

/// 日志工具模块
///
/// 提供批次处理日志的辅助函数

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 发送模式描述
pub fn log_startup(mode: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 工作纸生成模式: {}", mode);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
///
/// # 参数
/// - `total`: 批次总数
pub fn log_batches_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的学校/年级批次", total);
    info!("💡 批次将按顺序逐一处理\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total`: 批次总数
/// - `school`: 学校
/// - `level`: 年级
pub fn log_batch_start(batch_num: usize, total: usize, school: &str, level: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批: {} · {}", batch_num, total, school, level);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `summary`: 结果摘要
pub fn log_batch_complete(batch_num: usize, summary: &str) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: {}", batch_num, summary);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `skipped`: 跳过数量
/// - `total`: 总数
pub fn print_final_stats(success: usize, skipped: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("⏭️ 跳过: {}", skipped);
    info!("{}", "=".repeat(60));
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
