//! User-facing output macros for the Skylift CLI.
//!
//! Progress and status lines go to stderr so stdout stays clean for the
//! final endpoint; `sky_println!` is the stdout channel.

#[macro_export]
macro_rules! sky_println {
    () => {
        println!();
    };
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! sky_error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! sky_success {
    ($($arg:tt)*) => {
        eprintln!("✓ {}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! sky_warning {
    ($($arg:tt)*) => {
        eprintln!("⚠ {}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! sky_progress {
    ($($arg:tt)*) => {
        eprintln!("▶ {}", format!($($arg)*));
    }
}
