//! The `bash` command
//!
//! Checks the invoking user against the operator list, starts a shell on a
//! fresh PTY and bridges it to the user's terminal until either side hangs
//! up or the caller tears the session down.

use std::io::{self, Read, Write};
use std::sync::Arc;

use async_trait::async_trait;
use mcs_core::config::ConfigFile;
use mcs_core::endpoint::ByteSource;
use mcs_core::traits::{CommandFactory, TerminalProvider};
use mcs_core::{Endpoint, Environment, McsError, OperatorList};
use tokio_util::sync::CancellationToken;

use crate::bridge::{BridgeReport, StreamBridge};
use crate::pty::PtyShellProvider;

/// Command token handled by [`BashCommand`]
pub const COMMAND_NAME: &str = "bash";

/// Shown to users who are not operators
pub const DENIAL_MESSAGE: &str = "Use of this command is restricted to operators.";

/// Relays the user's terminal to a local shell
pub struct BashCommand {
    operators: Arc<OperatorList>,
    terminals: Arc<dyn TerminalProvider>,
    bridge: StreamBridge,
    enforce_operator_check: bool,
}

impl BashCommand {
    /// Create the command with its collaborators
    pub fn new(
        operators: Arc<OperatorList>,
        terminals: Arc<dyn TerminalProvider>,
        bridge: StreamBridge,
    ) -> Self {
        Self {
            operators,
            terminals,
            bridge,
            enforce_operator_check: false,
        }
    }

    /// Build the command from a loaded config, spawning shells on local PTYs
    pub fn from_config(config: &ConfigFile, operators: Arc<OperatorList>) -> Self {
        let terminals = Arc::new(PtyShellProvider::from_config(&config.bash));
        Self::new(operators, terminals, StreamBridge::new(config.bridge.clone()))
            .enforce_operator_check(config.bash.enforce_operator_check)
    }

    /// Stop after the denial message instead of starting the shell anyway
    pub fn enforce_operator_check(mut self, enforce: bool) -> Self {
        self.enforce_operator_check = enforce;
        self
    }

    /// Run a session, returning the bridge report.
    ///
    /// `Ok(None)` means a non-operator was turned away.
    pub async fn run_session(
        &self,
        mut terminal: Endpoint,
        env: &Environment,
        shutdown: CancellationToken,
    ) -> Result<Option<BridgeReport>, McsError> {
        let identity = env.user();
        let authorized = identity
            .as_ref()
            .is_some_and(|user| self.operators.is_authorized(user.as_str()));

        if !authorized {
            tracing::warn!(
                "{} is not an operator",
                identity
                    .as_ref()
                    .map(|u| u.as_str())
                    .unwrap_or("<unknown user>")
            );
            if let Err(e) = write_line(terminal.sink_mut(), DENIAL_MESSAGE) {
                tracing::warn!("Failed to show denial message: {}", e);
            }
            if self.enforce_operator_check {
                return Ok(None);
            }
        }

        let mut subprocess = self.terminals.open(env.terminal_size()).map_err(|e| {
            tracing::error!("Failed to start shell: {}", e);
            e
        })?;

        let shell = match subprocess.take_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::error!("Failed to attach to shell: {}", e);
                subprocess.close();
                return Err(e.into());
            }
        };

        // The session ends when the caller tears it down or the shell's
        // output closes.
        let session = shutdown.child_token();
        let shell = watch_hangup(shell, session.clone());

        tracing::info!(
            "Starting bash session for {} (PID {:?})",
            identity.as_ref().map(|u| u.as_str()).unwrap_or("<unknown user>"),
            subprocess.pid()
        );

        let report = self.bridge.run(terminal, shell, &session).await;

        let exit_code = tokio::task::spawn_blocking(move || subprocess.close())
            .await
            .unwrap_or(None);
        tracing::info!("Bash session ended (exit code {:?})", exit_code);

        Ok(Some(report))
    }
}

#[async_trait]
impl CommandFactory for BashCommand {
    fn can_handle(&self, name: &str) -> bool {
        name == COMMAND_NAME
    }

    async fn execute(
        &self,
        _name: &str,
        terminal: Endpoint,
        env: &Environment,
        shutdown: CancellationToken,
    ) -> Result<(), McsError> {
        self.run_session(terminal, env, shutdown).await.map(|_| ())
    }
}

fn write_line(sink: &mut (dyn Write + Send), line: &str) -> io::Result<()> {
    // The user terminal may be in raw mode, so carriage return explicitly.
    sink.write_all(line.as_bytes())?;
    sink.write_all(b"\r\n")?;
    sink.flush()
}

/// Wrap the shell endpoint so the session is cancelled when its output ends
fn watch_hangup(shell: Endpoint, session: CancellationToken) -> Endpoint {
    let (name, source, sink) = shell.into_parts();
    let source: ByteSource = Box::new(HangupSource { inner: source, session });
    Endpoint::new(name, source, sink)
}

struct HangupSource {
    inner: ByteSource,
    session: CancellationToken,
}

impl Read for HangupSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        match &result {
            Ok(0) => self.session.cancel(),
            Err(e)
                if !matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                ) =>
            {
                self.session.cancel()
            }
            _ => {}
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::{ChannelSource, SharedSink};
    use crate::bridge::RelayOutcome;
    use mcs_core::config::BridgeConfig;
    use mcs_core::error::SetupError;
    use mcs_core::traits::SubprocessTerminal;
    use mcs_core::types::ENV_USER;
    use mcs_core::{OperatorEntry, TerminalSize};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Shell stand-in that prints a fixed banner and records its input
    struct FakeShell {
        output: Option<Vec<u8>>,
        input: SharedSink,
        closed: Arc<AtomicBool>,
    }

    impl SubprocessTerminal for FakeShell {
        fn pid(&self) -> Option<u32> {
            Some(4242)
        }

        fn take_endpoint(&mut self) -> Result<Endpoint, SetupError> {
            let output = self
                .output
                .take()
                .ok_or_else(|| SetupError::Endpoint("taken".to_string()))?;
            Ok(Endpoint::new(
                "fake-shell",
                Box::new(Cursor::new(output)),
                Box::new(self.input.clone()),
            ))
        }

        fn close(&mut self) -> Option<i32> {
            self.closed.store(true, Ordering::SeqCst);
            Some(0)
        }
    }

    #[derive(Default)]
    struct FakeProvider {
        banner: Vec<u8>,
        input: SharedSink,
        closed: Arc<AtomicBool>,
        opened: AtomicUsize,
        last_size: Mutex<Option<TerminalSize>>,
        fail: bool,
    }

    impl TerminalProvider for FakeProvider {
        fn open(&self, size: TerminalSize) -> Result<Box<dyn SubprocessTerminal>, SetupError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            *self.last_size.lock().unwrap() = Some(size);
            if self.fail {
                return Err(SetupError::PtyAllocation("no ptys left".to_string()));
            }
            Ok(Box::new(FakeShell {
                output: Some(self.banner.clone()),
                input: self.input.clone(),
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    fn operators(names: &[&str]) -> Arc<OperatorList> {
        Arc::new(names.iter().map(|n| OperatorEntry::new(*n)).collect())
    }

    fn command(provider: Arc<FakeProvider>, ops: &[&str]) -> BashCommand {
        BashCommand::new(
            operators(ops),
            provider,
            StreamBridge::new(BridgeConfig {
                chunk_size: 64,
                teardown_grace: Duration::from_millis(50),
            }),
        )
    }

    fn env(user: &str) -> Environment {
        Environment::new().with_var(ENV_USER, user)
    }

    #[test]
    fn test_handles_only_bash() {
        let cmd = command(Arc::new(FakeProvider::default()), &[]);
        assert!(cmd.can_handle("bash"));
        assert!(!cmd.can_handle("sh"));
        assert!(!cmd.can_handle("Bash"));
    }

    #[tokio::test]
    async fn test_operator_session_shows_shell_output() {
        let provider = Arc::new(FakeProvider {
            banner: b"$ ".to_vec(),
            ..Default::default()
        });
        let screen = SharedSink::new();
        let (keys, keyboard) = ChannelSource::new();
        let terminal = Endpoint::new("terminal", Box::new(keyboard), Box::new(screen.clone()));

        keys.send(b"ls\r".to_vec()).unwrap();
        drop(keys);

        let report = command(Arc::clone(&provider), &["alice"])
            .run_session(terminal, &env("alice"), CancellationToken::new())
            .await
            .unwrap()
            .expect("session started");

        assert_eq!(screen.contents(), b"$ ");
        assert!(report.reverse.is_some());
        assert!(matches!(
            report.reverse.unwrap().outcome,
            RelayOutcome::Drained
        ));
        assert!(provider.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_non_operator_is_warned_but_session_starts() {
        let provider = Arc::new(FakeProvider {
            banner: b"$ ".to_vec(),
            ..Default::default()
        });
        let screen = SharedSink::new();
        let terminal = Endpoint::new("terminal", Box::new(io::empty()), Box::new(screen.clone()));

        let report = command(Arc::clone(&provider), &["alice"])
            .run_session(terminal, &env("mallory"), CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_some());
        assert_eq!(provider.opened.load(Ordering::SeqCst), 1);
        let shown = String::from_utf8(screen.contents()).unwrap();
        assert!(shown.starts_with(DENIAL_MESSAGE));
        assert!(shown.ends_with("$ "));
    }

    #[tokio::test]
    async fn test_enforced_check_stops_non_operator() {
        let provider = Arc::new(FakeProvider::default());
        let screen = SharedSink::new();
        let terminal = Endpoint::new("terminal", Box::new(io::empty()), Box::new(screen.clone()));

        let report = command(Arc::clone(&provider), &[])
            .enforce_operator_check(true)
            .run_session(terminal, &env("alice"), CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_none());
        assert_eq!(provider.opened.load(Ordering::SeqCst), 0);
        assert_eq!(
            screen.contents(),
            format!("{}\r\n", DENIAL_MESSAGE).into_bytes()
        );
    }

    #[tokio::test]
    async fn test_missing_user_is_not_an_operator() {
        let provider = Arc::new(FakeProvider::default());
        let screen = SharedSink::new();
        let terminal = Endpoint::new("terminal", Box::new(io::empty()), Box::new(screen.clone()));

        let report = command(Arc::clone(&provider), &["alice"])
            .enforce_operator_check(true)
            .run_session(terminal, &Environment::new(), CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_setup_failure_is_returned() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..Default::default()
        });
        let terminal = Endpoint::new(
            "terminal",
            Box::new(io::empty()),
            Box::new(SharedSink::new()),
        );

        let result = command(Arc::clone(&provider), &["alice"])
            .execute("bash", terminal, &env("alice"), CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(McsError::Setup(SetupError::PtyAllocation(_)))
        ));
    }

    #[tokio::test]
    async fn test_shell_hangup_ends_session_with_idle_keyboard() {
        let provider = Arc::new(FakeProvider {
            banner: b"bye\r\n".to_vec(),
            ..Default::default()
        });
        let screen = SharedSink::new();
        // Keyboard never types and never closes.
        let (keys, keyboard) = ChannelSource::new();
        let terminal = Endpoint::new("terminal", Box::new(keyboard), Box::new(screen.clone()));

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            command(Arc::clone(&provider), &["alice"]).run_session(
                terminal,
                &env("alice"),
                CancellationToken::new(),
            ),
        )
        .await
        .expect("session ends once the shell hangs up")
        .unwrap()
        .unwrap();

        assert!(report.interrupted);
        assert_eq!(screen.contents(), b"bye\r\n");
        assert!(provider.closed.load(Ordering::SeqCst));
        drop(keys);
    }

    #[tokio::test]
    async fn test_terminal_size_comes_from_environment() {
        let provider = Arc::new(FakeProvider::default());
        let terminal = Endpoint::new(
            "terminal",
            Box::new(io::empty()),
            Box::new(SharedSink::new()),
        );
        let env = env("alice")
            .with_var("COLUMNS", "100")
            .with_var("LINES", "30");

        command(Arc::clone(&provider), &["alice"])
            .run_session(terminal, &env, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            *provider.last_size.lock().unwrap(),
            Some(TerminalSize::new(100, 30))
        );
    }
}
