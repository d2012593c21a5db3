use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Writes log records to stderr so they never mix with prompts on stdout
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// `-q` silences everything but errors; each `-v` adds a level
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            LevelFilter::Error
        } else {
            match verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        Self::new(level)
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%H:%M:%S%.3f");
            match record.level() {
                Level::Error | Level::Warn => {
                    eprintln!("{} {:<5} {}", timestamp, record.level(), record.args())
                }
                _ => eprintln!(
                    "{} {:<5} [{}] {}",
                    timestamp,
                    record.level(),
                    record.target(),
                    record.args()
                ),
            }
        }
    }

    fn flush(&self) {}
}
