//! Startup banner.
//!
//! Printed straight to stdout before the logging pipeline exists, so it is
//! never reframed as log records.

use std::io::{self, Write};

pub const ENV_VERSION: &str = "OBGW_VERSION";

const BANNER: [&str; 6] = [
    r"_______               ________        _____ _________        _____                                   ",
    r"__  __ \_______ _____ ___  __ )______ __  /___  ____/______ ___  /______ ___      ________ ______  __",
    r"_  / / /__  __ \_  _ \__  __  |_  __ \_  __/_  / __  _  __ `/_  __/_  _ \__ | /| / /_  __ `/__  / / /",
    r"/ /_/ / _  / / //  __/_  /_/ / / /_/ // /_  / /_/ /  / /_/ / / /_  /  __/__ |/ |/ / / /_/ / _  /_/ / ",
    r"\____/  /_/ /_/ \___/ /_____/  \____/ \__/  \____/   \__,_/  \__/  \___/ ____/|__/  \__,_/  _\__, /  ",
    r"                                                                                            /____/   ",
];

/// Version shown in the banner: `OBGW_VERSION`, else the crate version.
pub fn version() -> String {
    std::env::var(ENV_VERSION).unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string())
}

pub fn splash(out: &mut impl Write, version: &str) -> io::Result<()> {
    for line in BANNER {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "OneBotGateway version {version}")?;
    writeln!(out, "Starting...")?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splash_ends_with_version() {
        let mut out = Vec::new();
        splash(&mut out, "1.0.0.0-Axiom").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), BANNER.len() + 3);
        assert_eq!(lines[BANNER.len()], "OneBotGateway version 1.0.0.0-Axiom");
        assert!(text.ends_with("Starting...\n\n"));
    }
}
