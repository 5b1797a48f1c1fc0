use std::sync::Arc;

use chrono::{Duration, Local};
use clap::Parser;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

use lostfound::{
    config::Settings,
    domain::{Category, City, NewAnnouncement, PostType},
    repository::CsvAnnouncementRepository,
    service::ServiceContext,
};

/// Append sample announcements to the configured table.
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Args {
    /// Number of announcements to create
    #[arg(short, long, default_value_t = 12)]
    count: usize,

    /// CSV file to write to (defaults to the configured data file)
    #[arg(long)]
    data_file: Option<String>,

    /// Password set on every seeded announcement
    #[arg(long, default_value = "seed123")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::new().unwrap_or_default();
    let data_file = args.data_file.unwrap_or(settings.storage.data_file);

    println!("🌱 Seeding {} announcements into {}...", args.count, data_file);

    let repo = Arc::new(CsvAnnouncementRepository::new(&data_file));
    let context = ServiceContext::new(repo, &settings.storage.images_dir);

    let mut rng = rand::thread_rng();
    let today = Local::now().date_naive();

    for _ in 0..args.count {
        let post_type = PostType::ALL.choose(&mut rng).cloned().unwrap_or(PostType::Lost);
        let category = Category::ALL.choose(&mut rng).cloned().unwrap_or(Category::Others);
        let city = City::ALL.choose(&mut rng).cloned().unwrap_or(City::KuwaitCity);

        let submission = NewAnnouncement {
            post_type,
            category,
            city,
            description: Sentence(4..12).fake_with_rng(&mut rng),
            event_date: today - Duration::days(rng.gen_range(0..120)),
            phone: format!("{:08}", rng.gen_range(0..100_000_000u32)),
            delete_password: args.password.clone(),
        };

        let created = context.announcement_service.submit(submission, Vec::new()).await?;
        println!(
            "  ✅ #{} {} {} in {}",
            created.id,
            created.post_type.label(),
            created.category.as_str(),
            created.city.as_str()
        );
    }

    println!("\n✨ Seeding complete!");
    println!("📝 Every seeded post uses the password: {}", args.password);

    Ok(())
}
