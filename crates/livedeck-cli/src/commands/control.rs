use anyhow::{Context, Result};
use livedeck_core::control::SubmissionReceipt;
use livedeck_core::ports::ControlClient;
use livedeck_infrastructure::{LiveApiClient, LivedeckConfig};

fn client(config: &LivedeckConfig) -> Result<LiveApiClient> {
    LiveApiClient::from_config(config).context("Failed to create API client")
}

fn print_receipt(receipt: &SubmissionReceipt, channel: &str) {
    match &receipt.stream_id {
        Some(stream_id) => println!(
            "✅ Submitted ({}); answer streams as {} on {}",
            receipt.status, channel, stream_id
        ),
        None => println!("✅ Submitted ({})", receipt.status),
    }
}

pub async fn ask(config: &LivedeckConfig, question: &str) -> Result<()> {
    let receipt = client(config)?
        .submit_question(question)
        .await
        .context("Failed to submit question")?;
    print_receipt(&receipt, "question_response");
    Ok(())
}

pub async fn reply(config: &LivedeckConfig, comment: &str) -> Result<()> {
    let receipt = client(config)?
        .submit_comment(comment)
        .await
        .context("Failed to submit comment")?;
    print_receipt(&receipt, "comment_reply");
    Ok(())
}

pub async fn set_script(config: &LivedeckConfig, script_id: i64) -> Result<()> {
    client(config)?
        .set_script(script_id)
        .await
        .with_context(|| format!("Failed to select script {}", script_id))?;
    println!("✅ Active script set to {}", script_id);
    Ok(())
}

pub async fn recommend(config: &LivedeckConfig, recommendation: &str) -> Result<()> {
    client(config)?
        .update_recommendation(recommendation)
        .await
        .context("Failed to update recommendation context")?;
    println!("✅ Recommendation context updated");
    Ok(())
}

pub async fn reset_stats(config: &LivedeckConfig) -> Result<()> {
    client(config)?
        .reset_stats()
        .await
        .context("Failed to reset statistics")?;
    println!("✅ Statistics reset");
    Ok(())
}
