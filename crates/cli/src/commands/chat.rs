use std::path::Path;

use formsmith_engine::TurnResponse;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_spec, Context};

const GENERATE_COMMAND: &str = "/generate";
const QUIT_COMMAND: &str = "/quit";

fn render_turn(turn: &TurnResponse) -> String {
    let mut text = turn.message.clone();
    if turn.ready_to_generate {
        text.push_str("\n\n[ready to generate]");
    }
    text
}

/// Interactive session on stdin. `/generate` freezes the current draft into
/// an artifact, `/quit` or end of input leaves.
pub(crate) async fn cmd_chat(ctx: &Context, session: Option<&str>, template: Option<&str>) {
    let session_id = match session {
        Some(id) => match ctx.engine.conversation(id).await {
            Ok(conversation) => conversation.id,
            Err(e) => ctx.fail(e),
        },
        None => match ctx.engine.start_session(&ctx.actor, template).await {
            Ok(started) => {
                if !ctx.quiet {
                    println!("session {}", started.session_id);
                    println!("{}", started.message);
                }
                started.session_id
            }
            Err(e) => ctx.fail(e),
        },
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => ctx.fail(format!("error reading stdin: {}", e)),
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == QUIT_COMMAND {
            break;
        }
        if message == GENERATE_COMMAND {
            // Stay in the loop on failure so the user can keep refining.
            match ctx.engine.generate(&session_id, false, &ctx.actor).await {
                Ok(response) => ctx.emit(&response, || {
                    format!("{} (artifact {})", response.message, response.artifact_id)
                }),
                Err(e) => crate::report_error(&e.to_string(), ctx.output, ctx.quiet),
            }
            continue;
        }
        match ctx.engine.send_message(&session_id, message).await {
            Ok(turn) => ctx.emit(&turn, || render_turn(&turn)),
            Err(e) => crate::report_error(&e.to_string(), ctx.output, ctx.quiet),
        }
    }
}

pub(crate) async fn cmd_send(ctx: &Context, session_id: &str, message: &str) {
    match ctx.engine.send_message(session_id, message).await {
        Ok(turn) => ctx.emit(&turn, || render_turn(&turn)),
        Err(e) => ctx.fail(e),
    }
}

/// Open a session whose draft is a specification read from disk.
pub(crate) async fn cmd_import(ctx: &Context, spec_path: &Path) {
    let spec = load_spec(spec_path).unwrap_or_else(|msg| ctx.fail(msg));
    match ctx.engine.import_draft(&ctx.actor, spec).await {
        Ok(imported) => ctx.emit(&imported, || {
            let mut lines = vec![imported.session_id.clone()];
            lines.extend(imported.issues.iter().map(|i| format!("  - {}", i)));
            lines.join("\n")
        }),
        Err(e) => ctx.fail(e),
    }
}
