use anyhow::{Context, anyhow};
use photobook_async_runtime::{EditorUpdate, PhotoSaveOutcome, UpdateSender};
use photobook_layout::{Editor, ImageSource, Result as LayoutResult, Storage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Read an image file and detect its format and pixel size
pub async fn read_image(path: &Path) -> anyhow::Result<ImageSource> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let reader = image::ImageReader::new(Cursor::new(&bytes)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| anyhow!("Unrecognized image format: {}", path.display()))?;
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ImageSource {
        name,
        mime: format.to_mime_type().to_string(),
        bytes,
        width,
        height,
    })
}

pub async fn handle_add_image<S: Storage>(
    path: PathBuf,
    editor: &mut Editor<S>,
    update_tx: &UpdateSender,
) {
    let source = match read_image(&path).await {
        Ok(source) => source,
        Err(e) => {
            let _ = update_tx.send(EditorUpdate::Error {
                message: format!("Failed to load image: {e:#}"),
            });
            return;
        }
    };

    let report = editor.add_image(source).await;
    match report.tray {
        Some(PhotoSaveOutcome::Degraded { stripped }) => {
            let _ = update_tx.send(EditorUpdate::Notice {
                message: format!(
                    "Storage is full: {stripped} unsaved photo(s) were removed from the photo tray"
                ),
            });
        }
        None => {
            let _ = update_tx.send(EditorUpdate::Error {
                message: "Storage is full: the photo tray could not be saved".to_string(),
            });
        }
        Some(PhotoSaveOutcome::Saved) => {}
    }
    let _ = update_tx.send(EditorUpdate::ImageAdded {
        id: report.id,
        blob_stored: report.blob_stored,
        tray: report.tray,
    });
    send_layers(editor, update_tx);
}

pub fn handle_add_text<S: Storage>(text: String, editor: &mut Editor<S>, update_tx: &UpdateSender) {
    let id = editor.add_text(text);
    let _ = update_tx.send(EditorUpdate::TextAdded { id });
    send_layers(editor, update_tx);
}

/// Report the outcome of an object edit and refresh the layer panel
pub fn handle_edit<S: Storage, T>(
    result: LayoutResult<T>,
    editor: &Editor<S>,
    update_tx: &UpdateSender,
) {
    match result {
        Ok(_) => send_layers(editor, update_tx),
        Err(e) => {
            let _ = update_tx.send(EditorUpdate::Error {
                message: e.to_string(),
            });
        }
    }
}

pub async fn handle_goto<S: Storage>(index: usize, editor: &mut Editor<S>, update_tx: &UpdateSender) {
    editor.goto_spread(index).await;
    send_spread(editor, update_tx);
}

pub async fn handle_add_spread<S: Storage>(editor: &mut Editor<S>, update_tx: &UpdateSender) {
    let message = if editor.add_spread().await {
        format!("Book now has {} pages", editor.book().total_pages())
    } else {
        format!(
            "Book already has the maximum of {} pages",
            editor.book().total_pages()
        )
    };
    let _ = update_tx.send(EditorUpdate::Notice { message });
}

pub async fn handle_reorder<S: Storage>(
    from: usize,
    to: usize,
    editor: &mut Editor<S>,
    update_tx: &UpdateSender,
) {
    match editor.reorder_spreads(from, to).await {
        Some(report) if report.is_complete() => {
            let _ = update_tx.send(EditorUpdate::Notice {
                message: format!("Moved spread {from} to {to}"),
            });
        }
        Some(report) => {
            let _ = update_tx.send(EditorUpdate::Error {
                message: format!(
                    "Moved spread {from} to {to}, but could not write {}",
                    report.failed_keys.join(", ")
                ),
            });
        }
        None => {
            let _ = update_tx.send(EditorUpdate::Error {
                message: format!("Cannot move spread {from} to {to}"),
            });
            return;
        }
    }
    send_spread(editor, update_tx);
    send_saved_spreads(editor, update_tx);
}

pub async fn handle_delete_spread<S: Storage>(
    index: usize,
    editor: &mut Editor<S>,
    update_tx: &UpdateSender,
) {
    if editor.delete_spread(index).await {
        let _ = update_tx.send(EditorUpdate::Notice {
            message: format!("Deleted saved content of spread {index}"),
        });
        send_saved_spreads(editor, update_tx);
        if index == editor.current_spread() {
            send_layers(editor, update_tx);
        }
    } else {
        let _ = update_tx.send(EditorUpdate::Error {
            message: format!("Failed to delete spread {index}"),
        });
    }
}

pub async fn handle_save<S: Storage>(editor: &mut Editor<S>, update_tx: &UpdateSender) {
    let saved = editor.save().await;
    report_save(editor, saved, update_tx);
}

pub fn report_save<S: Storage>(editor: &Editor<S>, saved: bool, update_tx: &UpdateSender) {
    let index = editor.current_spread();
    let update = if saved {
        EditorUpdate::Saved { index }
    } else {
        EditorUpdate::Error {
            message: format!("Saving spread {index} failed"),
        }
    };
    let _ = update_tx.send(update);
}

pub fn send_spread<S: Storage>(editor: &Editor<S>, update_tx: &UpdateSender) {
    let _ = update_tx.send(EditorUpdate::SpreadChanged {
        index: editor.current_spread(),
        label: editor.spread_label(),
    });
    send_layers(editor, update_tx);
}

pub fn send_layers<S: Storage>(editor: &Editor<S>, update_tx: &UpdateSender) {
    let _ = update_tx.send(EditorUpdate::Layers {
        layers: editor.layers(),
    });
}

pub fn send_saved_spreads<S: Storage>(editor: &Editor<S>, update_tx: &UpdateSender) {
    let _ = update_tx.send(EditorUpdate::SavedSpreads {
        spreads: editor.saved_spreads(),
    });
}

pub fn send_zoom<S: Storage>(editor: &Editor<S>, update_tx: &UpdateSender) {
    let _ = update_tx.send(EditorUpdate::Zoom {
        zoom: editor.zoom(),
    });
}
