use crate::{PrintCommand, PrintUpdate};
use printng::{
    DocumentOpener, HttpClient, MapState, PrintOptionsPatch, PrintOutcome, PrintRequest,
    PrintSession, snapshot::SurfaceHost,
};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Async worker task that owns a print session and processes commands.
///
/// Veto listeners must be registered on the session before it is handed
/// over; the worker forwards the plain notifications as updates.
pub async fn worker_task<C, H, O>(
    mut session: PrintSession<C, H, O>,
    mut map: MapState,
    mut command_rx: mpsc::UnboundedReceiver<PrintCommand>,
    update_tx: mpsc::UnboundedSender<PrintUpdate>,
) where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    forward_events(&mut session, &update_tx);

    let mut deferred = VecDeque::new();
    loop {
        let cmd = match deferred.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        process_command(
            cmd,
            &mut session,
            &mut map,
            &mut command_rx,
            &mut deferred,
            &update_tx,
        )
        .await;
    }
    log::debug!("Print worker stopped");
}

fn forward_events<C, H, O>(
    session: &mut PrintSession<C, H, O>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    let tx = update_tx.clone();
    session.catalog_mut().loaded.subscribe(move |event| {
        let _ = tx.send(PrintUpdate::TemplatesLoaded {
            templates: event.templates.clone(),
            active: event.active.clone(),
        });
    });

    let tx = update_tx.clone();
    session.events_mut().options_changed.subscribe(move |event| {
        let _ = tx.send(PrintUpdate::OptionsChanged {
            keys: event.changed.clone(),
        });
    });

    let tx = update_tx.clone();
    session.events_mut().print_exception.subscribe(move |event| {
        let _ = tx.send(PrintUpdate::Error {
            stage: Some(event.stage),
            message: event.message.clone(),
        });
    });
}

async fn process_command<C, H, O>(
    cmd: PrintCommand,
    session: &mut PrintSession<C, H, O>,
    map: &mut MapState,
    command_rx: &mut mpsc::UnboundedReceiver<PrintCommand>,
    deferred: &mut VecDeque<PrintCommand>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    match cmd {
        PrintCommand::LoadTemplates => {
            if let Err(e) = session.load_templates().await {
                let _ = update_tx.send(PrintUpdate::Error {
                    stage: None,
                    message: e.to_string(),
                });
            }
        }
        PrintCommand::Preview { mut request } => {
            // Drain queued previews, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                match next_cmd {
                    PrintCommand::Preview {
                        request: new_request,
                    } => {
                        log::debug!("Discarding queued preview, using newer request");
                        request = new_request;
                    }
                    // Option updates apply now so the preview sees them
                    other => {
                        if let Some(pending) = apply_settings(other, session, map, update_tx) {
                            deferred.push_back(pending);
                            break;
                        }
                    }
                }
            }
            run_print(session, map, request, true, command_rx, deferred, update_tx).await;
        }
        PrintCommand::Print { request } => {
            run_print(session, map, request, false, command_rx, deferred, update_tx).await;
        }
        PrintCommand::Commit => {
            let outcome = session.commit();
            report_outcome(outcome, update_tx);
        }
        other => {
            if let Some(unhandled) = apply_settings(other, session, map, update_tx) {
                log::warn!("Unhandled print command {:?}", unhandled);
            }
        }
    }
}

/// Apply a command that only touches session settings.
///
/// Returns the command back when it needs the async path.
fn apply_settings<C, H, O>(
    cmd: PrintCommand,
    session: &mut PrintSession<C, H, O>,
    map: &mut MapState,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) -> Option<PrintCommand>
where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    match cmd {
        PrintCommand::SetOptions { patch } => {
            session.set_options(patch);
        }
        PrintCommand::SelectPaper { name } => {
            if let Err(e) = session.select_paper_named(&name) {
                let _ = update_tx.send(PrintUpdate::Error {
                    stage: None,
                    message: e.to_string(),
                });
            }
        }
        PrintCommand::SetActiveTemplate { id } => {
            session.set_options(PrintOptionsPatch::default().active_template(id));
        }
        PrintCommand::SetMap { map: new_map } => {
            *map = new_map;
        }
        other => return Some(other),
    }
    None
}

/// Run one print, refusing other print commands until it finishes.
/// Everything else that arrives meanwhile is deferred.
async fn run_print<C, H, O>(
    session: &mut PrintSession<C, H, O>,
    map: &MapState,
    request: PrintRequest,
    preview: bool,
    command_rx: &mut mpsc::UnboundedReceiver<PrintCommand>,
    deferred: &mut VecDeque<PrintCommand>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) where
    C: HttpClient,
    H: SurfaceHost,
    O: DocumentOpener,
{
    let print = async {
        if preview {
            session.preview(map, request).await
        } else {
            session.print(map, request).await
        }
    };
    tokio::pin!(print);

    let outcome = loop {
        tokio::select! {
            outcome = &mut print => break outcome,
            Some(cmd) = command_rx.recv() => {
                if cmd.is_print() {
                    log::warn!("Rejecting {:?}: print in progress", cmd);
                    let _ = update_tx.send(PrintUpdate::Rejected {
                        reason: "A print is already in progress".to_string(),
                    });
                } else {
                    deferred.push_back(cmd);
                }
            }
        }
    };
    report_outcome(outcome, update_tx);
}

fn report_outcome(outcome: PrintOutcome, update_tx: &mpsc::UnboundedSender<PrintUpdate>) {
    let update = match outcome {
        PrintOutcome::Cancelled => PrintUpdate::Cancelled,
        PrintOutcome::Previewed { url, .. } => PrintUpdate::Previewed { url },
        PrintOutcome::Delivered { url, .. } => PrintUpdate::Delivered { url },
        PrintOutcome::Vetoed { url, .. } => PrintUpdate::DownloadVetoed { url },
        // Already reported through the print_exception channel
        PrintOutcome::Failed { .. } => return,
    };
    let _ = update_tx.send(update);
}
