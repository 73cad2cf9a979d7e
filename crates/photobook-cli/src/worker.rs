use photobook_async_runtime::{CommandReceiver, EditorCommand, EditorUpdate, UpdateSender};
use photobook_layout::{Editor, Storage, Viewport};
use tokio::time::Instant;

use crate::handlers;

/// Async worker task that owns the editor, applies commands and sends updates.
///
/// Between commands it waits for the autosave deadline. When the command
/// channel closes, pending changes are saved before returning.
pub async fn worker_task<S: Storage>(
    mut editor: Editor<S>,
    mut command_rx: CommandReceiver,
    update_tx: UpdateSender,
) {
    handlers::send_spread(&editor, &update_tx);

    // A command pulled off the channel while collapsing a burst
    let mut backlog: Option<EditorCommand> = None;
    loop {
        let cmd = match backlog.take() {
            Some(cmd) => cmd,
            None => {
                let deadline = editor.autosave_deadline();
                tokio::select! {
                    cmd = command_rx.recv() => match cmd {
                        Some(cmd) => cmd,
                        None => break,
                    },
                    _ = wait_for(deadline) => {
                        if let Some(saved) = editor.autosave_if_due(Instant::now()).await {
                            log::debug!("Autosaved spread {}", editor.current_spread());
                            handlers::report_save(&editor, saved, &update_tx);
                        }
                        continue;
                    }
                }
            }
        };
        backlog = process_command(cmd, &mut editor, &mut command_rx, &update_tx).await;
    }

    if let Some(saved) = editor.flush().await {
        handlers::report_save(&editor, saved, &update_tx);
    }
    log::debug!("Command channel closed, worker finished");
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Apply one command. Returns a command that was dequeued but not handled.
async fn process_command<S: Storage>(
    cmd: EditorCommand,
    editor: &mut Editor<S>,
    command_rx: &mut CommandReceiver,
    update_tx: &UpdateSender,
) -> Option<EditorCommand> {
    match cmd {
        EditorCommand::AddImage { path } => {
            handlers::handle_add_image(path, editor, update_tx).await;
        }
        EditorCommand::AddText { text } => {
            handlers::handle_add_text(text, editor, update_tx);
        }
        EditorCommand::MoveObject { id, left, top } => {
            let result = editor.move_object(&id, left, top);
            handlers::handle_edit(result, editor, update_tx);
        }
        EditorCommand::ScaleObject {
            id,
            scale_x,
            scale_y,
            uniform,
        } => {
            let result = editor.scale_object(&id, scale_x, scale_y, uniform);
            handlers::handle_edit(result, editor, update_tx);
        }
        EditorCommand::RemoveObject { id } => {
            let result = editor.remove_object(&id);
            handlers::handle_edit(result, editor, update_tx);
        }
        EditorCommand::Clear => {
            editor.clear();
            handlers::send_layers(editor, update_tx);
        }
        EditorCommand::SetTextColor { id, color } => match editor.set_text_color(&id, &color) {
            Ok(true) => handlers::send_layers(editor, update_tx),
            Ok(false) => {
                let _ = update_tx.send(EditorUpdate::Notice {
                    message: "Text colour only applies to text objects".to_string(),
                });
            }
            Err(e) => {
                let _ = update_tx.send(EditorUpdate::Error {
                    message: e.to_string(),
                });
            }
        },
        EditorCommand::Undo => {
            if editor.undo() {
                handlers::send_layers(editor, update_tx);
            }
        }
        EditorCommand::Redo => {
            if editor.redo() {
                handlers::send_layers(editor, update_tx);
            }
        }
        EditorCommand::MoveLayer { id, index } => {
            if editor.move_layer(&id, index) {
                handlers::send_layers(editor, update_tx);
            } else {
                let _ = update_tx.send(EditorUpdate::Error {
                    message: format!("Object not found: {id}"),
                });
            }
        }
        EditorCommand::Save => {
            handlers::handle_save(editor, update_tx).await;
        }
        EditorCommand::GotoSpread { index } => {
            handlers::handle_goto(index, editor, update_tx).await;
        }
        EditorCommand::NextSpread => {
            let index = editor.current_spread() + 1;
            handlers::handle_goto(index, editor, update_tx).await;
        }
        EditorCommand::PrevSpread => {
            let index = editor.current_spread().saturating_sub(1);
            handlers::handle_goto(index, editor, update_tx).await;
        }
        EditorCommand::AddSpread => {
            handlers::handle_add_spread(editor, update_tx).await;
        }
        EditorCommand::ReorderSpreads { from, to } => {
            handlers::handle_reorder(from, to, editor, update_tx).await;
        }
        EditorCommand::DeleteSpread { index } => {
            handlers::handle_delete_spread(index, editor, update_tx).await;
        }
        EditorCommand::SetZoom { mut zoom } => {
            // Collapse queued zoom requests, keeping only the most recent
            let mut next = None;
            while let Ok(queued) = command_rx.try_recv() {
                if let EditorCommand::SetZoom { zoom: newer } = queued {
                    log::debug!("Discarding queued zoom, using newer request");
                    zoom = newer;
                } else {
                    next = Some(queued);
                    break;
                }
            }
            editor.set_zoom(zoom).await;
            handlers::send_zoom(editor, update_tx);
            return next;
        }
        EditorCommand::ZoomIn => {
            editor.zoom_in().await;
            handlers::send_zoom(editor, update_tx);
        }
        EditorCommand::ZoomOut => {
            editor.zoom_out().await;
            handlers::send_zoom(editor, update_tx);
        }
        EditorCommand::ZoomReset => {
            editor.zoom_reset().await;
            handlers::send_zoom(editor, update_tx);
        }
        EditorCommand::Resize {
            mut width,
            mut height,
        } => {
            // Collapse queued resizes, keeping only the most recent
            let mut next = None;
            while let Ok(queued) = command_rx.try_recv() {
                if let EditorCommand::Resize {
                    width: newer_width,
                    height: newer_height,
                } = queued
                {
                    log::debug!("Discarding queued resize, using newer size");
                    width = newer_width;
                    height = newer_height;
                } else {
                    next = Some(queued);
                    break;
                }
            }
            editor.resize(Viewport::new(width, height));
            handlers::send_layers(editor, update_tx);
            return next;
        }
        EditorCommand::SetTheme { theme } => {
            editor.set_theme(theme).await;
            let _ = update_tx.send(EditorUpdate::Notice {
                message: format!("Theme set to {theme:?}"),
            });
        }
        EditorCommand::ListSpreads => {
            handlers::send_saved_spreads(editor, update_tx);
        }
    }
    None
}
