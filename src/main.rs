use anyhow::Result;
use tokio_cron_scheduler::JobScheduler;

pub mod cache;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod dashboard;
pub mod declare;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod snapshot;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    // 已安裝過時會回傳 Err，可忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    logging::info_console(format!(
        "EtfDashboard 啟動，追蹤 {} 檔 ETF，回溯 {} 年",
        config::SETTINGS.etfs.len(),
        config::SETTINGS.system.lookback_years
    ));

    // 第一次計算在背景進行，完成前頁面顯示載入中
    tokio::spawn(async {
        if let Err(why) = event::refresh::execute().await {
            logging::error_file_async(format!("Failed to refresh on start-up because {:?}", why));
        }
    });

    let sched = JobScheduler::new().await?;
    scheduler::start(&sched).await?;

    dashboard::serve(&config::SETTINGS.bind_addr()).await
}
