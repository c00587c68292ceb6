use clap::Parser;
use tracing_subscriber::EnvFilter;

use uscisanalyzer::models::{AnalysisReport, DateWindow, SentimentLabel};
use uscisanalyzer::{
    AnalysisConfig, AnalysisPipeline, CollectionOrchestrator, CollectorConfig, Config, Error,
    RedditClient, RedditCredentials, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "uscisanalyzer")]
#[command(version = "0.1.0")]
#[command(about = "Collect r/USCIS posts and report on common queries, topics, sentiment and categories")]
struct Args {
    /// Subreddit to collect from (overrides SUBREDDIT)
    #[arg(short, long)]
    subreddit: Option<String>,

    /// Total number of posts to request across the primary strategies
    #[arg(short, long)]
    limit: Option<u32>,

    /// Start of the collection window (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    start: Option<String>,

    /// End of the collection window (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    end: Option<String>,

    /// Database path for posts and reports (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Collect again even if the database already holds posts
    #[arg(long)]
    refresh: bool,

    /// Authenticate, print the account name and exit
    #[arg(long)]
    check_connection: bool,

    /// Print the latest stored report without re-analyzing
    #[arg(long)]
    cached: bool,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Number of topics to extract (overrides NUM_TOPICS)
    #[arg(long)]
    topics: Option<usize>,

    /// Number of frequent words to report (overrides TOP_WORDS)
    #[arg(long)]
    top_words: Option<usize>,

    /// Minimum number of documents a topic term must appear in (overrides MIN_DF)
    #[arg(long)]
    min_df: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("uscisanalyzer=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let subreddit = args.subreddit.clone().unwrap_or_else(|| config.subreddit.clone());

    if args.check_connection {
        let credentials = RedditCredentials::from_env()?;
        let client = RedditClient::connect(&credentials, &subreddit).await?;
        let name = client.verify().await?;
        println!("Connected to Reddit as u/{}", name);
        return Ok(());
    }

    let database = args.database.clone().unwrap_or_else(|| config.database_path.clone());

    if args.cached {
        match Storage::open_existing(&database) {
            Ok(existing) => {
                if let Some(report) = existing.latest_report()? {
                    tracing::info!("Using cached report from {}", report.generated_at);
                    output_report(&report, &args)?;
                    return Ok(());
                }
            }
            Err(Error::MissingData(reason)) => tracing::debug!("{}", reason),
            Err(e) => return Err(e.into()),
        }
        tracing::info!("No cached report found, performing fresh analysis");
    }

    let storage = Storage::new(&database)?;

    let dataset = if storage.has_posts()? && !args.refresh {
        tracing::info!("Reusing posts stored in {} (pass --refresh to collect again)", database);
        storage.load_dataset()?
    } else {
        let window = resolve_window(
            args.start.as_deref().or(config.start_date.as_deref()),
            args.end.as_deref().or(config.end_date.as_deref()),
        )?;
        let credentials = RedditCredentials::from_env()?;
        let client = RedditClient::connect(&credentials, &subreddit).await?;

        let orchestrator = CollectionOrchestrator::new(client, CollectorConfig::from(&config));
        let target = args.limit.unwrap_or(config.collect_limit);

        tracing::info!("Collecting up to {} posts from r/{}", target, subreddit);
        let dataset = orchestrator.collect(target, &window).await;
        storage.save_dataset(&dataset)?;
        dataset
    };

    if dataset.is_empty() {
        tracing::warn!("No posts available; the report will be empty");
    }

    let mut analysis_config = AnalysisConfig::from(&config);
    if let Some(topics) = args.topics {
        analysis_config.num_topics = topics;
    }
    if let Some(top_words) = args.top_words {
        analysis_config.top_words = top_words;
    }
    if let Some(min_df) = args.min_df {
        analysis_config.min_df = min_df;
    }
    let pipeline = AnalysisPipeline::new(analysis_config);

    tracing::info!("Starting analysis of {} posts", dataset.len());
    let report = pipeline.run(&dataset);
    storage.save_report(&report)?;

    output_report(&report, &args)?;

    Ok(())
}

fn resolve_window(start: Option<&str>, end: Option<&str>) -> anyhow::Result<DateWindow> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateWindow::parse(start, end)?),
        (None, None) => Ok(DateWindow::last_days(365)),
        _ => anyhow::bail!("both a start and an end date are needed to set the collection window"),
    }
}

fn output_report(report: &AnalysisReport, args: &Args) -> anyhow::Result<()> {
    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(report)?,
        "markdown" => format_markdown(report),
        _ => format_text(report),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn format_date_range(report: &AnalysisReport) -> String {
    match report.date_range {
        Some((first, last)) => format!(
            "{} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        None => "n/a".to_string(),
    }
}

fn key_insights(report: &AnalysisReport) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some((word, count)) = report.queries.top_words.first() {
        insights.push(format!(
            "Most discussed term: '{}' ({} mentions)",
            word, count
        ));
    }

    let counts = &report.sentiment.counts;
    if let Some(label) = counts.dominant() {
        insights.push(format!(
            "Overall sentiment: {} ({:.1}% of posts)",
            label,
            percent(counts.get(label), counts.total())
        ));
    }

    if let Some(category) = report.categories.top() {
        insights.push(format!(
            "Primary category: {} ({} posts)",
            category.display_name(),
            category.count
        ));
    }

    insights.push(format!(
        "Average engagement: {:.1} comments per post",
        report.average_comments
    ));

    insights
}

fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("\n=== USCIS Subreddit Analysis ===\n\n");
    output.push_str(&format!("Posts collected: {}\n", report.total_posts));
    output.push_str(&format!("Posts analyzed: {}\n", report.analyzed_posts));
    if report.fallback_posts > 0 {
        output.push_str(&format!(
            "Fallback posts (outside window): {}\n",
            report.fallback_posts
        ));
    }
    output.push_str(&format!("Date range: {}\n", format_date_range(report)));
    output.push_str(&format!(
        "Question posts: {} ({:.1}%)\n\n",
        report.queries.question_posts,
        report.queries.question_share() * 100.0
    ));

    output.push_str("Top Keywords:\n");
    for (word, count) in report.queries.top_words.iter().take(15) {
        output.push_str(&format!("  - {}: {}\n", word, count));
    }

    if !report.topics.is_empty() {
        output.push_str("\nTopics:\n");
        for topic in &report.topics {
            output.push_str(&format!("  {}\n", topic.description));
        }
    }

    let counts = &report.sentiment.counts;
    output.push_str("\nSentiment:\n");
    for label in SentimentLabel::ALL {
        output.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            label,
            counts.get(label),
            percent(counts.get(label), counts.total())
        ));
    }
    output.push_str(&format!(
        "  Average polarity: {:.3}\n",
        report.sentiment.average_polarity
    ));

    output.push_str("\nCategories:\n");
    for category in report.categories.by_count() {
        output.push_str(&format!(
            "  - {}: {} posts\n",
            category.display_name(),
            category.count
        ));
    }

    output.push_str("\nKey Insights:\n");
    for insight in key_insights(report) {
        output.push_str(&format!("  * {}\n", insight));
    }

    output.push_str(&format!(
        "\nGenerated on: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn format_markdown(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("# USCIS Subreddit Analysis Report\n\n");

    output.push_str("## Dataset Overview\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Posts Collected | {} |\n", report.total_posts));
    output.push_str(&format!("| Posts Analyzed | {} |\n", report.analyzed_posts));
    output.push_str(&format!("| Fallback Posts | {} |\n", report.fallback_posts));
    output.push_str(&format!("| Date Range | {} |\n", format_date_range(report)));
    output.push_str(&format!(
        "| Avg. Comments | {:.1} |\n",
        report.average_comments
    ));

    output.push_str("\n## Common Queries\n\n");
    output.push_str(&format!(
        "{} of {} posts ({:.1}%) ask a question.\n\n",
        report.queries.question_posts,
        report.queries.total_posts,
        report.queries.question_share() * 100.0
    ));
    output.push_str("| Keyword | Mentions |\n|---------|----------|\n");
    for (word, count) in report.queries.top_words.iter().take(15) {
        output.push_str(&format!("| {} | {} |\n", word, count));
    }

    output.push_str("\n## Topics\n\n");
    if report.topics.is_empty() {
        output.push_str("_Not enough posts to extract topics._\n");
    } else {
        for topic in &report.topics {
            output.push_str(&format!(
                "- **Topic {}**: {}\n",
                topic.id,
                topic.keywords.join(", ")
            ));
        }
    }

    let counts = &report.sentiment.counts;
    output.push_str("\n## Sentiment Distribution\n\n");
    output.push_str("| Sentiment | Posts | Share |\n|-----------|-------|-------|\n");
    for label in SentimentLabel::ALL {
        output.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            label,
            counts.get(label),
            percent(counts.get(label), counts.total())
        ));
    }
    output.push_str(&format!(
        "\nAverage polarity: {:.3}\n",
        report.sentiment.average_polarity
    ));

    if !report.sentiment.monthly.is_empty() {
        output.push_str("\n### Monthly Trend\n\n");
        output.push_str("| Month | Positive | Neutral | Negative |\n");
        output.push_str("|-------|----------|---------|----------|\n");
        for (month, month_counts) in &report.sentiment.monthly {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                month, month_counts.positive, month_counts.neutral, month_counts.negative
            ));
        }
    }

    output.push_str("\n## USCIS Categories\n\n");
    output.push_str("| Category | Posts |\n|----------|-------|\n");
    for category in report.categories.by_count() {
        output.push_str(&format!(
            "| {} | {} |\n",
            category.display_name(),
            category.count
        ));
    }

    output.push_str("\n## Key Insights\n\n");
    for insight in key_insights(report) {
        output.push_str(&format!("- {}\n", insight));
    }

    output.push_str(&format!(
        "\n---\n*Generated on {}*\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
