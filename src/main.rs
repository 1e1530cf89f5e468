#![cfg(not(tarpaulin_include))]

use clap::{Args, Parser, Subcommand};
use inspection_form::config::{AppConfig, RecipientConfig};
use inspection_form::extractor::extract_items;
use inspection_form::model::HeaderFields;
use inspection_form::photos::{read_photo, save_photo};
use inspection_form::report::{ReportInput, ReportStrategy, ReportWriter};
use inspection_form::roster::load_roster;
use inspection_form::session::InspectionSession;
use inspection_form::text::normalize_email;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "inspection-form", about = "入荷検査フォーム", version)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manual workbook (overrides the settings file)
    #[arg(long, global = true)]
    manual: Option<PathBuf>,

    /// Report layout: fresh or template
    #[arg(long, global = true)]
    strategy: Option<ReportStrategy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the inspection items found in the manual
    Items,
    /// List inspectors and their addresses
    Roster,
    /// Fill in the checklist and generate a report
    Inspect(InspectArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// 作業者
    #[arg(long)]
    operator: String,

    /// 確認者
    #[arg(long)]
    reviewer: String,

    /// IN.NO
    #[arg(long, default_value = "")]
    in_no: String,

    /// ロットNO
    #[arg(long, default_value = "")]
    lot_no: String,

    /// 検査日 (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Recipients; the last selection is reused when omitted
    #[arg(long = "to", value_delimiter = ',')]
    recipients: Vec<String>,

    /// Mail the report after generating it
    #[arg(long)]
    send: bool,

    /// Do not ask for photos
    #[arg(long)]
    no_photos: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(manual) = cli.manual {
        config.manual_path = manual;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }

    match cli.command {
        Command::Items => list_items(&config),
        Command::Roster => list_roster(&config),
        Command::Inspect(args) => inspect(&config, args),
    }
}

fn list_items(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = extract_items(&config.manual_path, &config.extraction);
    if let Some(diagnostic) = extraction.diagnostic {
        eprintln!("❌ {}", diagnostic);
        return Ok(());
    }

    println!("✅ {}件の検査項目を読み込みました", extraction.items.len());
    for (idx, item) in extraction.items.iter().enumerate() {
        println!("{:>3}. [{}] {} (row {})", idx + 1, item.category, item.description, item.row);
    }
    Ok(())
}

fn list_roster(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (roster, diagnostic) = load_roster(&config.roster_path);
    if let Some(diagnostic) = diagnostic {
        eprintln!("❌ {}", diagnostic);
        return Ok(());
    }
    for inspector in &roster.inspectors {
        println!("{}\t{}", inspector.name, inspector.email);
    }
    Ok(())
}

fn inspect(config: &AppConfig, args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = extract_items(&config.manual_path, &config.extraction);
    if let Some(diagnostic) = &extraction.diagnostic {
        eprintln!("❌ {}", diagnostic);
    }
    if extraction.items.is_empty() {
        eprintln!("❌ 検査マニュアルの読み込みに失敗しました");
        return Ok(());
    }

    let (roster, _) = load_roster(&config.roster_path);
    for name in [&args.operator, &args.reviewer] {
        if !roster.is_empty() && roster.find(name).is_none() {
            log::warn!("'{}' is not in the inspector roster", name);
        }
    }

    let mut header = HeaderFields::with_defaults(&args.operator, &args.reviewer);
    header.in_no = args.in_no.clone();
    header.lot_no = args.lot_no.clone();
    if let Some(date) = &args.date {
        header.inspection_date = date.clone();
    }

    let mut session = InspectionSession::new(extraction.items);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    fill_in(&mut session, &mut input, config, !args.no_photos)?;

    if !session.has_answers() {
        println!("ℹ️ 回答がないためレポートを作成しません");
        return Ok(());
    }
    print_summary(&session, &header);

    let writer = ReportWriter::new(config.strategy, &config.manual_path)
        .with_layout(config.layout.clone());
    let report = match writer.generate(&ReportInput::from_session(&session, &header)) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Excel 作成エラー: {}", e);
            return Ok(());
        }
    };

    fs::create_dir_all(&config.output_dir)?;
    let out_path = config.output_dir.join(&report.filename);
    fs::write(&out_path, &report.bytes)?;
    println!("✅ Excel 生成完了：{}", out_path.display());

    let recipients = select_recipients(&args.recipients, &config.recipients_path)?;
    if !args.send {
        return Ok(());
    }
    if recipients.is_empty() {
        println!("📧 送信先が選択されていません");
        return Ok(());
    }
    send_report(&recipients, &report, &header);
    Ok(())
}

fn fill_in(
    session: &mut InspectionSession,
    input: &mut impl BufRead,
    config: &AppConfig,
    ask_photos: bool,
) -> io::Result<()> {
    let items = session.items().to_vec();
    for (idx, item) in items.iter().enumerate() {
        println!("\nNo. {}: {}", idx + 1, item.category);
        println!("  📝 {}", item.description);

        let answer = loop {
            let line = prompt(input, "  可/否 (y/n, 空欄でスキップ) > ")?;
            match line.as_str() {
                "可" | "y" | "Y" | "1" => break Some(true),
                "否" | "n" | "N" | "0" => break Some(false),
                "" | "s" => break None,
                _ => println!("  可 または 否 を入力してください"),
            }
        };
        if let Some(pass) = answer {
            if let Err(e) = session.record_verdict(&item.id, pass) {
                eprintln!("  ❌ {}", e);
            }
        }

        if ask_photos {
            let path = prompt(input, "  写真パス (空欄でスキップ) > ")?;
            if !path.is_empty() {
                attach(session, &item.id, Path::new(&path), &config.photo_dir);
            }
        }
    }
    Ok(())
}

fn attach(session: &mut InspectionSession, item_id: &str, path: &Path, photo_dir: &Path) {
    let photo = match read_photo(path) {
        Ok(photo) => photo,
        Err(e) => {
            eprintln!("  ❌ 写真読込エラー: {}", e);
            return;
        }
    };
    match save_photo(photo_dir, item_id, &photo) {
        Ok(saved) => println!("  ✅ 写真保存：{}", saved.display()),
        Err(e) => eprintln!("  ❌ 写真保存エラー: {}", e),
    }
    if let Err(e) = session.attach_photo(item_id, photo) {
        eprintln!("  ❌ {}", e);
    }
}

fn prompt(input: &mut impl BufRead, text: &str) -> io::Result<String> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_summary(session: &InspectionSession, header: &HeaderFields) {
    let summary = session.summary();
    println!("\n📊 検査結果一覧 (検査ID {})", header.inspection_id);
    println!(
        "合格項目 {} / 不合格項目 {} / 写真添付数 {}",
        summary.passed, summary.failed, summary.photos
    );
    for row in session.preview() {
        println!(
            "{:>3}  {}  {}  {}  {}",
            row.no,
            row.category,
            row.description,
            row.label,
            if row.has_photo { "📷 あり" } else { "なし" }
        );
    }
}

fn select_recipients(
    requested: &[String],
    config_path: &Path,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if requested.is_empty() {
        return Ok(RecipientConfig::load(config_path).selected_emails);
    }
    let selected: Vec<String> = requested
        .iter()
        .map(|r| normalize_email(r))
        .filter(|r| !r.is_empty())
        .collect();
    RecipientConfig {
        selected_emails: selected.clone(),
    }
    .save(config_path)?;
    Ok(selected)
}

#[cfg(feature = "mail")]
fn send_report(
    recipients: &[String],
    report: &inspection_form::model::ReportDocument,
    header: &HeaderFields,
) {
    use inspection_form::mailer::{MailRequest, SmtpSettings, dispatch_report};

    println!("📬 送信先：{}", recipients.join(", "));
    let settings = match SmtpSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ メール設定エラー: {}", e);
            return;
        }
    };
    let outcome = dispatch_report(&settings, &MailRequest::for_report(recipients, report, header));
    if outcome.success {
        println!("✅ {}", outcome.message);
    } else {
        eprintln!("❌ {}", outcome.message);
    }
}

#[cfg(not(feature = "mail"))]
fn send_report(
    _recipients: &[String],
    _report: &inspection_form::model::ReportDocument,
    _header: &HeaderFields,
) {
    eprintln!("⚠️ Mail support requires the 'mail' feature");
}
