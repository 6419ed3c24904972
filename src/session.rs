//! Interactive chat session and one-shot prompts.

use std::future::Future;
use std::io::{self, BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::llm::{ChatClient, ModelConfig, Reply};
use crate::message::{Conversation, Message};
use crate::persona::{Persona, Roster};
use crate::ui::{print_bordered, print_reply};

const EXIT_WORDS: &[&str] = &["exit", "quit", "/exit", "/quit"];
const GOODBYE: &str = "Leaving chat mode";
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Leave the session.
    Exit,
    /// Blank line.
    Empty,
    /// `/<persona>`: switch without asking anything.
    SwitchPersona(&'static Persona),
    /// `/<persona> <text>`: switch, then ask.
    AskPersona(&'static Persona, &'a str),
    /// `/<persona>` followed by nothing but whitespace.
    MissingText(&'static Persona),
    /// A slash command that names no persona.
    Unknown(&'a str),
    /// Plain text for the current persona.
    Ask(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(input: &'a str, roster: &Roster) -> Command<'a> {
        // Trailing whitespace matters for `/<persona> ` so slash commands are
        // split before the full trim.
        let raw = input.trim_start();
        let input = input.trim();

        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            return Command::Exit;
        }

        if let Some(rest) = raw.strip_prefix('/') {
            let name = rest.split(' ').next().unwrap_or("");
            let Some(persona) = roster.get(&name.to_lowercase()) else {
                return Command::Unknown(input);
            };

            let after_name = &rest[name.len()..];
            if after_name.is_empty() {
                return Command::SwitchPersona(persona);
            }
            let text = after_name.trim();
            return if text.is_empty() {
                Command::MissingText(persona)
            } else {
                Command::AskPersona(persona, text)
            };
        }

        if input.is_empty() {
            Command::Empty
        } else {
            Command::Ask(input)
        }
    }
}

/// Conversation state for one terminal session.
pub struct Session {
    client: ChatClient,
    model: ModelConfig,
    roster: Roster,
    persona: &'static Persona,
    conversation: Conversation,
}

impl Session {
    /// Start a session with the default persona's prompt and greeting.
    pub fn new(client: ChatClient, model: ModelConfig) -> Self {
        let roster = Roster::default();
        let persona = roster.default_persona();

        let mut conversation = Conversation::new();
        conversation.push(Message::system(persona.system_prompt));
        conversation.push(Message::assistant(persona.greeting));

        Self {
            client,
            model,
            roster,
            persona,
            conversation,
        }
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Greeting plus the list of persona commands.
    pub fn welcome(&self) -> String {
        format!("{}\n\n{}", self.persona.greeting, self.roster.switch_guide())
    }

    pub fn switch_persona(&mut self, persona: &'static Persona) {
        debug!(persona = persona.key, "switching persona");
        self.persona = persona;
        self.conversation.set_system_prompt(persona.system_prompt);
    }

    /// Send `text` as the user and record the answer.
    ///
    /// Error replies are returned but not added to the history.
    pub async fn ask(&mut self, text: &str) -> Reply {
        self.conversation.push(Message::user(text));

        let reply = self
            .client
            .send(&self.model, self.conversation.messages())
            .await;
        if let Reply::Text(answer) = &reply {
            self.conversation.push(Message::assistant(answer.clone()));
        }

        if self.conversation.trim() {
            debug!("history trimmed to system prompt and recent turns");
        }
        reply
    }
}

/// Answer a single prompt with the default persona.
pub async fn ask_once(client: &ChatClient, model: &ModelConfig, prompt: &str) -> Reply {
    let persona = Roster::default().default_persona();
    let messages = [Message::system(persona.system_prompt), Message::user(prompt)];
    debug!(prompt, "handling single prompt");
    client.send(model, &messages).await
}

/// Run the read-eval-print loop until the user leaves.
pub async fn run(mut session: Session) -> anyhow::Result<()> {
    print_bordered(&session.persona.label(), &session.welcome());

    let mut lines = spawn_line_reader(BufReader::new(io::stdin()))?;
    loop {
        show_prompt(session.persona)?;

        let line = tokio::select! {
            line = lines.recv() => line.transpose()?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!("\n{GOODBYE}");
            return Ok(());
        };

        let (persona, text) = match Command::parse(&line, &session.roster) {
            Command::Exit => {
                println!("\n{GOODBYE}");
                return Ok(());
            }
            Command::Empty => continue,
            Command::Unknown(input) => {
                println!("\nUnknown command: {input}\n");
                continue;
            }
            Command::MissingText(persona) => {
                println!(
                    "\nPlease type something after the command, e.g. /{} hello\n",
                    persona.key
                );
                continue;
            }
            Command::SwitchPersona(persona) => {
                session.switch_persona(persona);
                print_bordered(
                    &persona.label(),
                    &format!("Switched to {} mode", persona.label()),
                );
                continue;
            }
            Command::AskPersona(persona, text) => {
                session.switch_persona(persona);
                (persona, text.to_string())
            }
            Command::Ask(text) => (session.persona, text.to_string()),
        };

        let reply = tokio::select! {
            reply = with_spinner(session.ask(&text)) => reply,
            _ = tokio::signal::ctrl_c() => {
                clear_line();
                println!("\n{GOODBYE}");
                return Ok(());
            }
        };
        print_reply(&persona.label(), &reply);
    }
}

/// Read lines from `reader` on a plain thread and hand them over a channel.
///
/// A blocking read cannot be cancelled, so it must not live on the runtime's
/// blocking pool: the runtime would wait for it on shutdown. The thread is
/// left behind when the receiver goes away and dies with the process.
pub fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::Receiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn show_prompt(persona: &Persona) -> io::Result<()> {
    let mut stdout = io::stdout();
    let prompt = format!("cao {} > ", persona.emoji);
    execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    print!("{}", prompt.cyan().bold());
    stdout.flush()
}

fn clear_line() {
    let _ = execute!(io::stdout(), MoveToColumn(0), Clear(ClearType::CurrentLine));
}

/// Show a spinner on the current line until `fut` completes.
async fn with_spinner<F: Future>(fut: F) -> F::Output {
    tokio::pin!(fut);
    let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
    let mut frame = 0;

    let output = loop {
        tokio::select! {
            output = &mut fut => break output,
            _ = ticker.tick() => {
                let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                let _ = execute!(io::stdout(), MoveToColumn(0), Print(format!("{glyph} ")));
                frame += 1;
            }
        }
    };

    clear_line();
    output
}
