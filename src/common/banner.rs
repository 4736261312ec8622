use crate::log_println;

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

macro_rules! env_or {
    ($key:literal, $default:literal) => {
        option_env!($key).unwrap_or($default)
    };
}

pub struct BannerInfo {
    pub version: &'static str,
    pub branch: &'static str,
    pub commit_short: &'static str,
    pub dirty: bool,
    pub profile: &'static str,
}

impl Default for BannerInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            branch: env_or!("GIT_BRANCH", "unknown"),
            commit_short: env_or!("GIT_COMMIT_SHORT", "unknown"),
            dirty: matches!(option_env!("GIT_DIRTY"), Some("true")),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

/// Runtime facts printed under the build information.
pub struct RuntimeInfo<'a> {
    pub address: &'a str,
    pub target: &'a str,
    pub providers: usize,
}

pub fn print_banner(info: &BannerInfo, runtime: &RuntimeInfo<'_>) {
    log_println!();
    log_println!("{GREEN}  reelgate{RESET} {DIM}media lookup + stream proxy{RESET}");
    log_println!("{DIM}========================================{RESET}");

    print_row("Version", info.version, CYAN);
    print_row("Branch", info.branch, RESET);

    let commit_display = if info.dirty {
        format!("{}{YELLOW} (dirty){RESET}", info.commit_short)
    } else {
        info.commit_short.to_owned()
    };
    print_row("Commit", &commit_display, RESET);
    print_row("Profile", info.profile, YELLOW);
    print_row("Listening", runtime.address, CYAN);
    print_row("Target", runtime.target, RESET);
    print_row("Providers", &runtime.providers.to_string(), RESET);
    log_println!();
}

fn print_row(label: &str, value: &str, color: &str) {
    log_println!("  {BOLD}{label:<14}{RESET}{color}{value}{RESET}");
}
