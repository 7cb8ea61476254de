use std::{sync::Arc, time::SystemTime};

use tracing_subscriber::EnvFilter;
use wirebox::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

#[derive(Default)]
struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        println!("{}", content);
    }
}

struct DateLogger {
    prefix: Arc<String>,
    logger: Arc<Box<dyn Logger>>,
}

impl DateLogger {
    fn new(prefix: Arc<String>, logger: Arc<Box<dyn Logger>>) -> Self {
        Self { prefix, logger }
    }

    fn log_date(&self) {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.logger
            .log(&format!("{} {}s since epoch", self.prefix, secs));
    }
}

fn main() -> Result<(), ResolveError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::new();

    registry.class("date_logger", DateLogger::new, &["prefix", "logger"]);
    registry.singleton(
        "logger",
        || Box::new(LoggerImpl) as Box<dyn Logger>,
        &[],
    );
    registry.literal("prefix", String::from("[demo]"));

    let logger: Arc<DateLogger> = registry.require("date_logger")?;
    logger.log_date();

    registry.resolve(
        |logger: Arc<Box<dyn Logger>>, missing: Option<Arc<String>>| {
            logger.log(&format!("optional dependency present: {}", missing.is_some()));
        },
        &["logger", "suffix"],
    )?;

    println!("{registry:?}");
    Ok(())
}
