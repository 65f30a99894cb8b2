//! `outreach` - CLI for recording outreach camps
//!
//! Each invocation is one session: it performs a single action, shows the
//! resulting banner and exits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use outreach::cli::{
    Cli, Command, ConfigCommand, DoctorCommand, ExportCommand, StatusCommand, SubmitCommand,
};
use outreach::{
    export_file_name, init_logging, to_csv, to_zip_bundle, BannerLevel, Config,
    ExportFormat, PhotoStore, PhotoUpload, Recorder, Session, Storage, DOCTOR_PLACEHOLDER,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let mut session = Session::new();
    let code = match run(cli, &mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<outreach::Error>() {
                Some(inner) if inner.is_user_error() => session.notify_error(inner),
                _ => session.notify(BannerLevel::Error, format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    };

    if let Some(banner) = session.take_message() {
        match banner.level {
            BannerLevel::Success => println!("{}", banner.text),
            BannerLevel::Warning | BannerLevel::Error => eprintln!("{banner}"),
        }
    }
    session.reset();
    code
}

fn run(cli: Cli, session: &mut Session) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Doctor(cmd) => handle_doctor(&config, cmd, session),
        Command::Submit(cmd) => handle_submit(&config, &cmd, session),
        Command::Export(cmd) => handle_export(&config, &cmd, session),
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    Ok(Storage::open(config.database_path())?)
}

fn handle_doctor(
    config: &Config,
    cmd: DoctorCommand,
    session: &mut Session,
) -> anyhow::Result<()> {
    let storage = open_storage(config)?;

    match cmd {
        DoctorCommand::List { json } => {
            let doctors = storage.list_doctors()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doctors)?);
            } else {
                for name in &doctors {
                    println!("{name}");
                }
                if doctors.is_empty() {
                    session.notify(BannerLevel::Warning, "No doctors registered yet.");
                }
            }
        }
        DoctorCommand::Add { name } => {
            if storage.add_doctor(&name)? {
                session.notify(
                    BannerLevel::Success,
                    format!("Doctor '{}' added successfully.", name.trim()),
                );
            } else {
                session.notify(
                    BannerLevel::Success,
                    format!("Doctor '{}' is already registered.", name.trim()),
                );
            }
        }
        DoctorCommand::Delete { name } => {
            let name = name.trim();
            if name.is_empty() || name == DOCTOR_PLACEHOLDER {
                session.notify(BannerLevel::Warning, "Please select a doctor.");
            } else if storage.delete_doctor(name)? {
                session.notify(
                    BannerLevel::Success,
                    format!("Doctor '{name}' deleted successfully."),
                );
            } else {
                session.notify(
                    BannerLevel::Warning,
                    format!("Doctor '{name}' is not registered."),
                );
            }
        }
    }
    Ok(())
}

fn handle_submit(
    config: &Config,
    cmd: &SubmitCommand,
    session: &mut Session,
) -> anyhow::Result<()> {
    let form = cmd.to_form().map_err(outreach::Error::from)?;
    form.validate().map_err(outreach::Error::from)?;
    let photo = cmd
        .photo
        .as_ref()
        .map(PhotoUpload::from_path)
        .transpose()
        .context("reading photo")?;

    let storage = open_storage(config)?;
    storage.ensure_registered_doctor(&form)?;
    let photos = PhotoStore::new(config.photo_dir());
    let receipt = Recorder::new(&storage, &photos).submit(&form, photo.as_ref())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        let summary = &receipt.summary;
        println!("Last Submitted Record");
        println!("---------------------");
        println!("Entry:      {}", receipt.id);
        println!("Place:      {}", summary.place);
        println!("Camp Date:  {}", summary.camp_date);
        println!("Doctor:     {}", summary.doctor);
        if let (Some(lat), Some(lon)) = (summary.latitude, summary.longitude) {
            println!("Location:   {lat:.6}, {lon:.6}");
        }
        if let Some(photo) = &summary.photo {
            println!("Photo:      {photo}");
        }
        println!();
    }

    session.record_submission(receipt.summary);
    session.notify(
        BannerLevel::Success,
        "Outreach camp data saved successfully.",
    );
    Ok(())
}

fn handle_export(
    config: &Config,
    cmd: &ExportCommand,
    session: &mut Session,
) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    if storage.count_entries()? == 0 {
        session.notify(BannerLevel::Warning, "No records available yet.");
        return Ok(());
    }

    let format = ExportFormat::from(cmd.format);
    let bytes = match format {
        ExportFormat::Csv => to_csv(&storage)?,
        ExportFormat::Zip => {
            let photos = PhotoStore::new(config.photo_dir());
            to_zip_bundle(&storage, &photos, &config.export)?
        }
    };

    let file_name = export_file_name(cmd.camp_date(), &cmd.place, format);
    let path = cmd.out.join(&file_name);
    write_artifact(&path, &bytes)?;

    session.notify(
        BannerLevel::Success,
        format!("Wrote {} ({} bytes, {})", path.display(), bytes.len(), format.content_type()),
    );
    Ok(())
}

fn write_artifact(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;
    let photo_dir = config.photo_dir();

    if cmd.json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "photo_dir": photo_dir,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("outreach status");
        println!("---------------");
        println!("Database:      {}", storage.path().display());
        println!("Photo store:   {}", photo_dir.display());
        println!("Entries:       {}", stats.total_entries);
        println!("Doctors:       {}", stats.total_doctors);
        println!("Photos:        {}", stats.distinct_photos);
        println!("DB size:       {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  Photo dir:      {}", config.photo_dir().display());
                println!();
                println!("[Export]");
                println!("  CSV name:       {}", config.export.csv_name);
                println!("  Images prefix:  {}", config.export.images_prefix);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
