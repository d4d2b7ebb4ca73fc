use chrono::{format::DelayedFormat, DateTime, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;
use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
};

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 單次寫入檔案前最多累積的位元組數
const FLUSH_THRESHOLD: usize = 4096;

pub struct Logger {
    writer: Sender<LogMessage>,
}

impl Logger {
    /// 建立一個寫入 `log/{name}_{yyyy-mm-dd}.log` 的記錄器
    pub fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<LogMessage>();
        let log_path = match Self::get_log_path(log_name) {
            Some(path) => path,
            None => {
                error_console(format!("Failed to create log directory for {}", log_name));
                return Logger { writer: tx };
            }
        };

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let file = match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
            {
                Ok(file) => file,
                Err(why) => {
                    error_console(format!(
                        "Failed to open log file {} because {:?}",
                        log_path.display(),
                        why
                    ));
                    // 無法寫檔時改為輸出到 console
                    while let Ok(received) = rx.recv() {
                        info_console(received.msg);
                    }
                    return;
                }
            };

            let mut writer = BufWriter::new(file);
            let mut line = String::with_capacity(FLUSH_THRESHOLD);

            while let Ok(received) = rx.recv() {
                if writeln!(
                    &mut line,
                    "{} {} {}",
                    received.created_at.format("%F %X%.6f"),
                    received.level,
                    received.msg
                )
                .is_err()
                {
                    continue;
                }

                if rx.is_empty() || line.len() >= FLUSH_THRESHOLD {
                    if writer.write_all(line.as_bytes()).is_err() || writer.flush().is_err() {
                        info_console(line.clone())
                    }

                    line.clear();
                }
            }
        });

        Logger { writer: tx }
    }

    pub fn info(&self, log: String) {
        self.send(log::Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(log::Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(log::Level::Error, log);
    }

    pub fn debug(&self, log: String) {
        self.send(log::Level::Debug, log);
    }

    fn send(&self, level: log::Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }

    fn get_log_path(name: &str) -> Option<PathBuf> {
        let path = Path::new("log");

        if !path.exists() {
            fs::create_dir_all(path).ok()?;
        }

        let mut log_path = PathBuf::from(path);
        log_path.push(concat_string!(
            name,
            "_",
            Local::now().format("%Y-%m-%d").to_string(),
            ".log"
        ));

        Some(log_path)
    }
}

pub struct LogMessage {
    pub level: log::Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: log::Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_message_keeps_level() {
        let msg = LogMessage::new(log::Level::Warn, "slow response".to_string());
        assert_eq!(msg.level, log::Level::Warn);
        assert_eq!(msg.msg, "slow response");
    }

    #[tokio::test]
    async fn test_named_logger() {
        let logger = Logger::new("test");
        logger.info("開始 named logger".to_string());
        logger.debug("結束 named logger".to_string());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(Path::new("log").exists());
    }
}
