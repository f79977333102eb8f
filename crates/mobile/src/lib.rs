pub mod app;
pub mod records;

uniffi::setup_scaffolding!();

/// Initialize the library with proper panic handling
/// Call this once at startup from Kotlin
#[uniffi::export]
pub fn init_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        eprintln!("=== RUST PANIC ===");
        eprintln!("{panic_info}");
        eprintln!("Backtrace:\n{backtrace}");
        eprintln!("=== END PANIC ===");
    }));
}

/// Route tracing output to logcat on device, stderr elsewhere.
/// Safe to call more than once; later calls are ignored.
#[uniffi::export]
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        use tracing_logcat::{LogcatMakeWriter, LogcatTag};

        let writer = LogcatMakeWriter::new(LogcatTag::Fixed("daytrip".to_owned()))
            .expect("failed to create logcat writer");
        let _ = tracing_subscriber::fmt()
            .with_writer(writer)
            .without_time()
            .with_ansi(false)
            .try_init();
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = tracing_subscriber::fmt().try_init();
    }

    tracing::info!("daytrip logging initialised");
}
