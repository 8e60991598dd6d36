//! Verbosity levels (spec section 6) mapped onto `log`/`env_logger`.

use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DebugLevel {
    Silent,
    Info,
    Verbose,
    Debug,
}

impl DebugLevel {
    fn level_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Silent => log::LevelFilter::Off,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Verbose => log::LevelFilter::Debug,
            DebugLevel::Debug => log::LevelFilter::Trace,
        }
    }
}

pub fn init(level: DebugLevel) {
    env_logger::Builder::new()
        .filter_level(level.level_filter())
        .format_timestamp(None)
        .format_target(false)
        .init();
}
