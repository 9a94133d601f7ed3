use std::sync::Arc;

use chronos_harness::prelude::*;
use chronos_harness::vendors::gemini::{self, GeminiProvider};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: gemini_transform <portrait> [offset]")?;
    let offset: i32 = args.next().as_deref().unwrap_or("20").parse()?;

    let harness = Harness::builder()
        .register_provider(Arc::new(GeminiProvider::from_env()?))
        .build()?;
    let client = harness.client(gemini::default_model())?;

    let portrait = ImagePayload::new("image/jpeg", std::fs::read(&path)?);
    let generated = client.generate(&portrait, offset).await?;
    if let Some(text) = &generated.commentary {
        println!("{text}");
    }
    let out = format!("chronos-lens-{offset}.png");
    std::fs::write(&out, generated.image.data())?;
    println!("wrote {out}");
    Ok(())
}
