use anyhow::Result;
use worksheet_admin::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    worksheet_admin::logger::init();

    // 加载配置：有密钥文件用文件，否则读环境变量
    let config = match std::env::var("WORKSHEET_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env(),
    };

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
