use std::{env, future::Future};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{config::SETTINGS, event, logging};

/// 啟動排程
///
/// 更新時間的 cron 設定錯誤時回傳 `Err`，不會略過。
pub async fn start(sched: &JobScheduler) -> Result<()> {
    if let Err(why) = run_cron(sched, &SETTINGS.system.refresh_cron).await {
        logging::error_file_async(format!(
            "Failed to start the scheduler with cron({}) because {:?}",
            SETTINGS.system.refresh_cron, why
        ));
        return Err(why);
    }

    logging::info_file_async(format!(
        "EtfDashboard 排程已啟動，更新時間︰{}\r\nRust OS/Arch: {}/{}\r\n",
        SETTINGS.system.refresh_cron,
        env::consts::OS,
        env::consts::ARCH
    ));

    Ok(())
}

async fn run_cron(sched: &JobScheduler, refresh_cron: &'static str) -> Result<()> {
    //                 sec  min   hour   day of month   month   day of week   year
    // UTC 時間
    let jobs = vec![
        // 美股收盤後重新抓取並計算所有 ETF
        create_job(refresh_cron, event::refresh::execute)?,
    ];

    for job in jobs {
        sched.add(job).await?;
    }

    sched.start().await?;
    Ok(())
}

fn create_job<F, Fut>(cron_expr: &'static str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    cron_expr, why
                ));
            }
        })
    })?)
}
