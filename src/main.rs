//! Gallery State - demo session
//!
//! Loads settings, builds the application state, and walks through a short
//! upload / comment / like session while subscribers log every change. The
//! final state is printed as snapshot JSON.

use {
    anyhow::Context,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
};

use gallery_state::{AppState, SettingsManager, UserSettings, error::Result};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = match SettingsManager::new() {
        Ok(manager) => manager.get_settings().clone(),
        Err(e) => {
            eprintln!("Falling back to default settings: {e}");
            UserSettings::default()
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app_state = AppState::from_settings(&settings);

    let gallery_log = app_state.gallery.subscribe(|images| {
        info!(images = images.len(), "Gallery changed");
    });
    let _ = app_state.profile.subscribe(|profile| {
        info!(user = %profile.user_name, moods = ?profile.moods, "Profile changed");
    });

    let receiver = app_state.gallery.subscribe_channel();
    let watcher = tokio::spawn(async move {
        let mut updates = 0_usize;
        while let Ok(images) = receiver.recv().await {
            updates += 1;
            let comments: usize = images.iter().map(|image| image.comments.len()).sum();
            info!(update = updates, comments, "Gallery update received");
        }
        updates
    });

    let user = app_state.profile.profile().user_name;
    let sunset = app_state
        .gallery
        .add_image("https://images.example.com/sunset.jpg", "sunset.jpg")
        .context("Failed to upload image")?;
    let harbor = app_state
        .gallery
        .add_image("https://images.example.com/harbor.jpg", "harbor.jpg")
        .context("Failed to upload image")?;

    app_state
        .gallery
        .add_comment(sunset.id, &user, "Taken from the pier")
        .context("Failed to comment on uploaded image")?;
    app_state
        .gallery
        .toggle_like(harbor.id, &user)
        .context("Failed to like uploaded image")?;
    if let Err(e) = app_state.gallery.add_comment(404, &user, "lost") {
        warn!(error = %e, "Comment on missing image rejected");
    }

    app_state.profile.set_about_text("Weekend photographer");
    app_state.profile.add_mood("Creative");

    gallery_log.unsubscribe();
    let snapshot = app_state.to_json().context("Failed to serialize state")?;
    println!("{snapshot}");

    drop(app_state);
    let updates = watcher.await.context("Gallery watcher panicked")?;
    info!(updates, "Session finished");

    Ok(())
}
