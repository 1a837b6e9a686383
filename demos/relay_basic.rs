use std::error::Error;
use std::sync::Arc;

use firebase_messaging_sw::app::{delete_app, initialize_app, FirebaseAppSettings, FirebaseOptions};
use firebase_messaging_sw::messaging::{get_messaging, MessagePayload};
use firebase_messaging_sw::sw::{
    register_background_relay, ClickOutcome, InMemoryScope, NotificationClick, NotificationRelay,
    PushOutcome, RelayConfig, ShownNotification,
};

fn main() -> Result<(), Box<dyn Error>> {
    // Placeholder credentials; nothing here talks to Firebase.
    let options = FirebaseOptions {
        api_key: Some("demo-api-key".into()),
        project_id: Some("demo-project".into()),
        messaging_sender_id: Some("1234567890".into()),
        ..Default::default()
    };
    let settings = FirebaseAppSettings {
        name: Some("relay-demo".into()),
        ..Default::default()
    };
    let app = initialize_app(options, Some(settings))?;
    let messaging = get_messaging(Some(app.clone()))?;

    // The in-memory scope stands in for the browser: one background tab is open.
    let scope = Arc::new(
        InMemoryScope::new("https://shop.example").with_window("https://shop.example/menu"),
    );
    let relay = Arc::new(NotificationRelay::new(scope.clone(), RelayConfig::from_environment()?));

    // Pushes dispatched through messaging are shown by the relay.
    let unsubscribe = register_background_relay(&messaging, relay.clone())?;
    let payload = MessagePayload::from_push_str(
        r#"{"notification":{"title":"Order #123","body":"Out for delivery"},"data":{"orderId":"123"}}"#,
    )?;
    messaging.dispatch_background_message(payload.clone());
    unsubscribe();

    futures::executor::block_on(async {
        // A push goes through the foreground check first.
        match relay.handle_push(&payload).await? {
            PushOutcome::Displayed(shown) => println!("Displayed '{}' (tag {})", shown.title, shown.options.tag),
            PushOutcome::Forwarded { client_ids } => println!("Forwarded to {client_ids:?}"),
        }

        // Clicking the notification focuses the open tab and asks it to navigate.
        let shown = scope.shown_notifications().remove(0);
        let notification = ShownNotification::new(shown.title.clone(), shown.options.data.clone().into())
            .with_close_handler(|| println!("Notification closed"));
        match relay
            .handle_notification_click(NotificationClick::new(notification, None))
            .await
        {
            ClickOutcome::FocusedExisting { client, url } => {
                println!("Focused {} and sent it to {url}", client.id)
            }
            other => println!("Click outcome: {other:?}"),
        }
        Ok::<(), Box<dyn Error>>(())
    })?;

    for (client, message) in scope.posted_messages() {
        println!("{client} <- {message}");
    }

    delete_app(&app)?;
    Ok(())
}
