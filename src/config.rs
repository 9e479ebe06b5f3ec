//! Client configuration from command-line flags and environment variables.
//!
//! Every flag has an environment fallback (a `.env` file is honored via
//! `dotenvy`, loaded by the binary before parsing). Proxy settings always
//! come from the environment.

use std::io;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use crossterm::tty::IsTty;
use url::Url;

use crate::error::SessionError;
use crate::ws::{ConnectOptions, ProxySettings, TrustPolicy, default_origin};

/// Default console prompt.
pub const DEFAULT_PROMPT: &str = "> ";

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "wsprobe", version, about = "Interactive WebSocket client")]
pub struct Args {
    /// Target address (ws://, wss://, http:// or https://)
    pub url: String,

    /// Origin header value [default: derived from URL]
    #[arg(short, long, env = "WSPROBE_ORIGIN")]
    pub origin: Option<String>,

    /// Authorization header value
    #[arg(long, env = "WSPROBE_AUTH")]
    pub auth: Option<String>,

    /// Skip TLS certificate verification
    #[arg(
        short = 'k',
        long,
        env = "WSPROBE_INSECURE",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub insecure: bool,

    /// Disable colored output (any non-empty value except 0/false/no/off)
    #[arg(
        long,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Input prompt shown on interactive terminals
    #[arg(long, env = "WSPROBE_PROMPT", default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Log filter directive for the requested verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Validated client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Target address, always `ws` or `wss`.
    pub url: Url,
    /// `Origin` header value.
    pub origin: String,
    /// `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// Certificate validation policy.
    pub trust: TrustPolicy,
    /// Whether console output is colored: off with `--no-color` or when
    /// stdout is not a terminal.
    pub colored: bool,
    /// Console prompt.
    pub prompt: String,
    /// Ambient proxy settings.
    pub proxy: ProxySettings,
}

impl ClientConfig {
    /// Validates `args`, reading proxy settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the URL cannot be parsed or uses
    /// a scheme other than `ws`, `wss`, `http` or `https`.
    pub fn from_args(args: Args) -> Result<Self, SessionError> {
        Self::with_proxy(args, ProxySettings::from_env())
    }

    /// Validates `args` with explicit proxy settings.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the URL is invalid.
    pub fn with_proxy(args: Args, proxy: ProxySettings) -> Result<Self, SessionError> {
        let url = parse_target(&args.url)?;
        let origin = args
            .origin
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| default_origin(&url));
        let authorization = args.auth.filter(|a| !a.is_empty());

        Ok(Self {
            url,
            origin,
            authorization,
            trust: TrustPolicy::from_insecure(args.insecure),
            colored: color_enabled(args.no_color, io::stdout().is_tty()),
            prompt: args.prompt,
            proxy,
        })
    }

    /// Handshake options for this configuration.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            url: self.url.clone(),
            origin: self.origin.clone(),
            authorization: self.authorization.clone(),
            trust: self.trust,
            proxy: self.proxy.clone(),
        }
    }
}

/// Colors are used only on a terminal and never when `--no-color` is set.
#[must_use]
pub const fn color_enabled(no_color: bool, is_tty: bool) -> bool {
    !no_color && is_tty
}

/// Parses a target address, rewriting `http`/`https` to `ws`/`wss`.
fn parse_target(raw: &str) -> Result<Url, SessionError> {
    let mut url =
        Url::parse(raw).map_err(|err| SessionError::Config(format!("invalid url {raw:?}: {err}")))?;
    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(SessionError::Config(format!(
                "unsupported scheme {other:?}; expected ws or wss"
            )));
        }
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        return Err(SessionError::Config(format!("cannot use {raw:?} as a websocket url")));
    }
    if url.host_str().is_none() {
        return Err(SessionError::Config(format!("url {raw:?} has no host")));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    fn args(argv: &[&str]) -> Args {
        let argv = std::iter::once("wsprobe").chain(argv.iter().copied());
        match Args::try_parse_from(argv) {
            Ok(args) => args,
            Err(err) => panic!("argument parsing failed: {err}"),
        }
    }

    fn config(argv: &[&str]) -> ClientConfig {
        match ClientConfig::with_proxy(args(argv), ProxySettings::default()) {
            Ok(config) => config,
            Err(err) => panic!("config failed: {err}"),
        }
    }

    #[test]
    fn origin_defaults_from_url() {
        let cfg = config(&["wss://echo.example.com/socket"]);
        assert_eq!(cfg.url.as_str(), "wss://echo.example.com/socket");
        assert_eq!(cfg.origin, "https://echo.example.com");
        assert!(cfg.authorization.is_none());
        assert_eq!(cfg.trust, TrustPolicy::Verify);
    }

    #[test]
    fn explicit_flags_are_kept() {
        let cfg = config(&[
            "ws://localhost:9000",
            "-o",
            "http://app.local",
            "--auth",
            "Bearer abc",
            "-k",
            "--no-color",
            "--prompt",
            "ws> ",
        ]);
        assert_eq!(cfg.origin, "http://app.local");
        assert_eq!(cfg.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(cfg.trust, TrustPolicy::SkipVerification);
        assert!(!cfg.colored);
        assert_eq!(cfg.prompt, "ws> ");
    }

    #[test]
    fn http_schemes_are_rewritten() {
        assert_eq!(config(&["http://h:1/x"]).url.as_str(), "ws://h:1/x");
        assert_eq!(config(&["https://h/x"]).url.as_str(), "wss://h/x");
    }

    #[test]
    fn other_schemes_are_rejected() {
        let result = ClientConfig::with_proxy(args(&["ftp://h/"]), ProxySettings::default());
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn garbage_url_is_rejected() {
        let result = ClientConfig::with_proxy(args(&["not a url"]), ProxySettings::default());
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn empty_auth_is_dropped() {
        let cfg = config(&["ws://h/", "--auth", ""]);
        assert!(cfg.authorization.is_none());
    }

    /// Parses `argv` with `field` reading its environment fallback from
    /// `var` instead, so tests never share a variable.
    fn args_with_env(field: &str, var: &'static str, value: &str, argv: &[&str]) -> Args {
        // Each caller uses its own variable name.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var(var, value);
        }
        let command = Args::command().mut_arg(field, |arg| arg.env(var));
        let argv = std::iter::once("wsprobe").chain(argv.iter().copied());
        let parsed = command
            .try_get_matches_from(argv)
            .and_then(|matches| Args::from_arg_matches(&matches));
        match parsed {
            Ok(args) => args,
            Err(err) => panic!("argument parsing failed: {err}"),
        }
    }

    #[test]
    fn no_color_accepts_any_nonempty_value() {
        let one = args_with_env("no_color", "WSPROBE_TEST_NO_COLOR_ONE", "1", &["ws://h/"]);
        assert!(one.no_color);
        let word = args_with_env("no_color", "WSPROBE_TEST_NO_COLOR_WORD", "x", &["ws://h/"]);
        assert!(word.no_color);
        let off = args_with_env("no_color", "WSPROBE_TEST_NO_COLOR_OFF", "0", &["ws://h/"]);
        assert!(!off.no_color);
        let empty = args_with_env("no_color", "WSPROBE_TEST_NO_COLOR_EMPTY", "", &["ws://h/"]);
        assert!(!empty.no_color);
    }

    #[test]
    fn insecure_accepts_numeric_env() {
        let on = args_with_env("insecure", "WSPROBE_TEST_INSECURE_ON", "1", &["ws://h/"]);
        assert!(on.insecure);
        let off = args_with_env("insecure", "WSPROBE_TEST_INSECURE_OFF", "false", &["ws://h/"]);
        assert!(!off.insecure);
    }

    #[test]
    fn bool_flags_still_work_on_command_line() {
        let parsed = args(&["ws://h/", "-k", "--no-color"]);
        assert!(parsed.insecure);
        assert!(parsed.no_color);
    }

    #[test]
    fn color_requires_terminal_and_no_opt_out() {
        assert!(color_enabled(false, true));
        assert!(!color_enabled(false, false));
        assert!(!color_enabled(true, true));
        assert!(!color_enabled(true, false));
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(args(&["ws://h/"]).log_level(), "warn");
        assert_eq!(args(&["ws://h/", "-vv"]).log_level(), "debug");
        assert_eq!(args(&["ws://h/", "-vvvv"]).log_level(), "trace");
    }

    #[test]
    fn connect_options_mirror_config() {
        let cfg = config(&["ws://h:1/", "--auth", "x"]);
        let options = cfg.connect_options();
        assert_eq!(options.url, cfg.url);
        assert_eq!(options.origin, "http://h:1");
        assert_eq!(options.authorization.as_deref(), Some("x"));
    }
}
