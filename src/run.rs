//! Application run modes: logger init, single message, interactive chat loop.

use std::io::{self, BufRead, Write};

use crate::cli::Args;
use crate::core;
use crate::core::api::ChatClient;
use crate::core::config::Config;
use crate::core::conversation::{self, Conversation, Sender, SurveyPhase};

/// Initialize env_logger. In interactive mode, writes to a file in the cache
/// directory to avoid interleaving log lines with the transcript.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    let interactive = args.prompt.is_none() && args.command.is_none();
    if interactive {
        let log_path = core::paths::cache_dir().map(|d| d.join(format!("{}.log", core::app::NAME)));
        if let Some(path) = log_path {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            if let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
            {
                logger.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }
    }
    let _ = logger.try_init();
}

/// Resolve the user id: `--user` flag, then env override, then stored session.
pub fn resolve_user_id(args: &Args, config: &Config) -> Option<String> {
    args.user
        .clone()
        .or_else(|| config.user_id.clone())
        .or_else(core::session::load_session)
}

fn require_user_id(args: &Args, config: &Config) -> String {
    resolve_user_id(args, config).unwrap_or_else(|| {
        eprintln!(
            "Error: no session. Run `{} login <ID>` or pass --user.",
            core::app::NAME
        );
        std::process::exit(1);
    })
}

/// Send one message, print the normalized reply to stdout.
pub async fn run_single_message(
    args: &Args,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let prompt_arg = args.prompt.as_ref().expect("prompt is some");
    let prompt = if prompt_arg == "-" {
        io::read_to_string(io::stdin())?
    } else {
        prompt_arg.clone()
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        eprintln!("Error: empty message");
        std::process::exit(1);
    }

    let user_id = require_user_id(args, config);
    let client = ChatClient::new(config)?;
    let response = client.send(&user_id, prompt, &[]).await?;

    let mut conversation = Conversation::new();
    conversation.ingest_response(&response);
    match conversation.transcript().last() {
        Some(turn) => println!("{}", turn.text),
        None => log::info!("response carried no displayable message"),
    }
    Ok(())
}

/// Show endpoint, token status, session state, and paths. Does not require a
/// valid token, so it works before any configuration exists.
pub fn print_config() {
    let base_url = std::env::var("COMPETENCY_API_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000 (default)".to_string());
    let token_set = std::env::var("COMPETENCY_API_TOKEN").is_ok();
    println!("{} {}", core::app::NAME, core::app::VERSION);
    println!("Endpoint:  {}", base_url);
    println!(
        "API token: {}",
        if token_set {
            "set (COMPETENCY_API_TOKEN)"
        } else {
            "NOT SET (export COMPETENCY_API_TOKEN)"
        }
    );
    match core::session::load_session() {
        Some(id) => println!("Session:   {}", id),
        None => println!("Session:   none (run `{} login <ID>`)", core::app::NAME),
    }
    if let Some(path) = core::session::session_path() {
        println!("Stored at: {}", path.display());
    }
}

/// Print every transcript turn not yet shown, with derived options and image
/// references. Returns the new printed count.
fn print_new_turns(conversation: &Conversation, printed: usize) -> usize {
    for turn in &conversation.transcript()[printed..] {
        let rendered = conversation.render(turn);
        let label = match turn.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };
        match &rendered.image {
            Some(image) => {
                if !image.remaining_text.is_empty() {
                    println!("[{}] {}: {}", turn.time_label(), label, image.remaining_text);
                }
                println!("    [image] {}", image.url);
                // One-shot fallback for drive links that refuse to serve directly
                if let Some(id) = core::message::drive_file_id(&image.url) {
                    let alt = core::message::direct_view_url(id);
                    if alt != image.url {
                        println!("    [image alt] {}", alt);
                    }
                }
            }
            None => println!("[{}] {}: {}", turn.time_label(), label, rendered.text),
        }
        if !rendered.options.is_empty() {
            println!("    (answer with a letter A-D, or type the full option)");
        }
    }
    conversation.transcript().len()
}

/// Interactive loop: initial empty message fetches the welcome or the first
/// question, then read-send-print until EOF or "exit". Requests are awaited
/// one at a time, so responses are processed in submission order.
pub async fn run_interactive(
    args: &Args,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = require_user_id(args, config);
    let client = ChatClient::new(config)?;
    let mut conversation = Conversation::new();
    let mut printed = 0;

    match client.send(&user_id, "", conversation.answers()).await {
        Ok(response) => conversation.ingest_response(&response),
        Err(e) => {
            log::error!("chat initialization failed: {}", e);
            conversation.push_bot(conversation::CONNECTION_APOLOGY);
        }
    }
    printed = print_new_turns(&conversation, printed);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        // While options are on offer, a full option line collapses to its
        // letter; anything else is sent as typed.
        let offering_options = conversation
            .transcript()
            .last()
            .is_some_and(|turn| !conversation.render(turn).options.is_empty());
        let submitted = if offering_options {
            conversation
                .resolve_option_selection(input)
                .unwrap_or_else(|| input.to_string())
        } else {
            input.to_string()
        };

        let was_complete = matches!(conversation.phase(), SurveyPhase::Complete { .. });
        conversation.record_answer(&submitted);
        conversation.push_user(&submitted);
        printed = print_new_turns(&conversation, printed);

        match client
            .send(&user_id, &submitted, conversation.answers())
            .await
        {
            Ok(response) => conversation.ingest_response(&response),
            Err(e) => {
                log::error!("message round-trip failed: {}", e);
                conversation.push_bot(conversation::PROCESSING_APOLOGY);
            }
        }
        printed = print_new_turns(&conversation, printed);

        if !was_complete
            && let SurveyPhase::Complete { level, score } = conversation.phase()
        {
            let level = level.as_deref().unwrap_or("unknown");
            match score {
                Some(score) => println!("-- Assessment complete: {} (score {}) --", level, score),
                None => println!("-- Assessment complete: {} --", level),
            }
        }
    }

    Ok(())
}
