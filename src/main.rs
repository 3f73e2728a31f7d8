use anyhow::Result;
use fitvoice::config::Config;
use fitvoice::dispatch::Dispatcher;
use fitvoice::feedback::{ConsoleFeedback, FeedbackSink};
use fitvoice::recognizer::{chain_from_config, ExternalProviders, SpeechRecognizer};
use fitvoice::telemetry;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;
    println!("✓ Config loaded from ~/.fitvoice.toml");

    // Initialize telemetry
    telemetry::init(config.telemetry.enabled, &config.telemetry.log_path)?;
    tracing::info!("fitvoice starting");

    // Build the dispatcher and the strategy chain. The demo binary
    // registers no external engine or platform recognizer, so the
    // chain typically falls through to the offline simulation.
    let dispatcher = Dispatcher::from_config(&config.commands);
    let chain = chain_from_config(&config, &ExternalProviders::default())?;
    println!("✓ Strategies registered: {}", chain.ids().join(", "));

    let mut recognizer = SpeechRecognizer::new(chain);
    let mut feedback = ConsoleFeedback;
    let (ended_tx, mut ended_rx) = mpsc::unbounded_channel();

    recognizer.set_on_result(move |transcript| {
        println!("heard: {transcript}");
        let outcome = dispatcher.dispatch(transcript);
        feedback.announce(outcome.feedback());
    });
    recognizer.set_on_error(|reason| {
        tracing::error!(reason, "recognition failed");
        eprintln!("recognition failed: {reason}");
    });
    recognizer.set_on_end(move || {
        let _ = ended_tx.send(());
    });

    recognizer.start();
    println!("\nFitvoice is listening. Press Ctrl+C to exit.\n");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            println!("\nShutting down...");
            recognizer.stop();
            let _ = ended_rx.recv().await;
        }
        _ = ended_rx.recv() => {
            tracing::info!("session ended");
            println!("\nSession ended.");
        }
    }

    Ok(())
}
