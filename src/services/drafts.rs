//! Editor sessions for the admin machine form
//!
//! Every open admin form owns one [`AdminEditor`]. Sessions are independent;
//! while one is submitting it stays locked and any other request on it is
//! turned away instead of queued, except for reads which get the state the
//! form had when the save started along with the live save progress.
//! Sessions left untouched longer than the configured TTL are evicted.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use tokio::{
    sync::{watch, Mutex, OwnedMutexGuard, RwLock},
    task::JoinHandle,
    time::Instant,
};
use uuid::Uuid;

use crate::{
    backend::MachineBackend,
    error::{AppError, AppResult},
    models::{
        views::{EditorStatus, EditorView},
        DraftPatch, ImageUpload, MachineRecord,
    },
    services::{editor::AdminEditor, previews::PreviewRegistry},
};

struct Session {
    editor: Arc<Mutex<AdminEditor>>,
    status: watch::Receiver<EditorStatus>,
    touched: StdMutex<Instant>,
    /// Form state captured when the running save started
    snapshot: StdMutex<Option<EditorView>>,
}

impl Session {
    fn new(editor: AdminEditor) -> Self {
        Self {
            status: editor.watch_status(),
            editor: Arc::new(Mutex::new(editor)),
            touched: StdMutex::new(Instant::now()),
            snapshot: StdMutex::new(None),
        }
    }

    fn touch(&self) {
        *self.touched.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.touched.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn is_busy(&self) -> bool {
        self.editor.try_lock().is_err()
    }
}

#[derive(Clone)]
pub struct DraftsService {
    backend: Arc<dyn MachineBackend>,
    previews: Arc<dyn PreviewRegistry>,
    max_images: usize,
    session_ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl DraftsService {
    pub fn new(
        backend: Arc<dyn MachineBackend>,
        previews: Arc<dyn PreviewRegistry>,
        max_images: usize,
        session_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            previews,
            max_images,
            session_ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a form: empty for a new machine, or seeded from `machine_id`
    pub async fn open(&self, machine_id: Option<&str>) -> AppResult<EditorView> {
        let editor = match machine_id {
            Some(id) => {
                let record = self
                    .backend
                    .get_machine(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Machine {} not found", id)))?;
                AdminEditor::edit(&record, self.previews.clone(), self.max_images)
            }
            None => AdminEditor::new(self.previews.clone(), self.max_images),
        };

        let session_id = Uuid::new_v4();
        let view = editor.view(session_id);
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Session::new(editor)));

        tracing::debug!("Opened editor session {}", session_id);
        Ok(view)
    }

    async fn session(&self, session_id: Uuid) -> AppResult<Arc<Session>> {
        let session = self
            .sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Editor session {} not found", session_id)))?;
        session.touch();
        Ok(session)
    }

    /// Lock a session, refusing if a save holds it
    async fn lock(&self, session_id: Uuid) -> AppResult<OwnedMutexGuard<AdminEditor>> {
        self.session(session_id)
            .await?
            .editor
            .clone()
            .try_lock_owned()
            .map_err(|_| AppError::Conflict("Save already in progress".to_string()))
    }

    /// Current form state; during a save, the form as submitted with the
    /// save's progress
    pub async fn view(&self, session_id: Uuid) -> AppResult<EditorView> {
        let session = self.session(session_id).await?;
        if let Ok(editor) = session.editor.clone().try_lock_owned() {
            return Ok(editor.view(session_id));
        }

        let snapshot = session
            .snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        snapshot
            .map(|view| EditorView {
                status: *session.status.borrow(),
                ..view
            })
            .ok_or_else(|| AppError::Conflict("Save already in progress".to_string()))
    }

    pub async fn update(&self, session_id: Uuid, patch: DraftPatch) -> AppResult<EditorView> {
        let mut editor = self.lock(session_id).await?;
        editor.update_draft(patch);
        Ok(editor.view(session_id))
    }

    pub async fn select_files(
        &self,
        session_id: Uuid,
        files: Vec<ImageUpload>,
    ) -> AppResult<EditorView> {
        let mut editor = self.lock(session_id).await?;
        editor.select_files(files)?;
        Ok(editor.view(session_id))
    }

    pub async fn remove_image(&self, session_id: Uuid, index: usize) -> AppResult<EditorView> {
        let mut editor = self.lock(session_id).await?;
        editor.remove_image(index)?;
        Ok(editor.view(session_id))
    }

    pub async fn dismiss_message(&self, session_id: Uuid) -> AppResult<EditorView> {
        let mut editor = self.lock(session_id).await?;
        editor.dismiss_message();
        Ok(editor.view(session_id))
    }

    pub async fn cancel(&self, session_id: Uuid) -> AppResult<EditorView> {
        let mut editor = self.lock(session_id).await?;
        editor.cancel();
        Ok(editor.view(session_id))
    }

    /// Submit the form.
    ///
    /// The save runs on its own task so that it completes even if the caller
    /// goes away; the session stays locked until it does.
    pub async fn submit(&self, session_id: Uuid) -> AppResult<(MachineRecord, EditorView)> {
        let session = self.session(session_id).await?;
        let mut editor = session
            .editor
            .clone()
            .try_lock_owned()
            .map_err(|_| AppError::Conflict("Save already in progress".to_string()))?;
        *session.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(editor.view(session_id));

        let backend = self.backend.clone();
        let result = tokio::spawn(async move {
            let result = editor.submit(backend.as_ref()).await;
            result.map(|saved| (saved, editor.view(session_id)))
        })
        .await;

        session.snapshot.lock().unwrap_or_else(|e| e.into_inner()).take();
        session.touch();
        result.map_err(|e| AppError::Internal(format!("Save task failed: {}", e)))?
    }

    /// Tear down a session, releasing its pending previews.
    ///
    /// A save still running keeps the editor alive until it finishes; its
    /// result is then discarded.
    pub async fn close(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| tracing::debug!("Closed editor session {}", session_id))
            .ok_or_else(|| AppError::NotFound(format!("Editor session {} not found", session_id)))
    }

    /// Drop sessions idle for longer than the TTL; a session mid-save is kept
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, session| {
            let keep = session.idle_for(now) < self.session_ttl || session.is_busy();
            if !keep {
                tracing::info!("Evicting idle editor session {}", id);
            }
            keep
        });

        before - sessions.len()
    }

    /// Periodically evict idle sessions for as long as the runtime lives
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let drafts = self.clone();
        let period = (self.session_ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = drafts.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!("Evicted {} idle editor sessions", evicted);
                }
            }
        })
    }

    pub async fn open_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
