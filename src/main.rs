// SPDX-License-Identifier: MIT

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use dockprefs::{
    DockDocument, Entry, EntryBuilder, FolderOptions, MatchAttribute, MatchOn, PlistFileGateway,
    PrefValue, SectionKey, SpacerType,
    cli::build_cli,
    dock::scalars::{self, ScalarDomain},
    prettifier::{apple_style_string, entry_line},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from `warn`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn gateway(matches: &ArgMatches) -> Result<PlistFileGateway> {
    let gateway = match matches.get_one::<String>("file") {
        Some(path) => PlistFileGateway::new(path),
        None => PlistFileGateway::dock()?,
    };
    // a custom file is never the live Dock's, so it is not reloaded either
    if matches.get_flag("no-restart") || matches.get_one::<String>("file").is_some() {
        return Ok(gateway.without_reloader());
    }
    Ok(gateway)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let gateway = gateway(matches)?;
    debug!("using {}", gateway.path().display());

    let Some((cmd, sub_m)) = matches.subcommand() else {
        bail!("subcommand required");
    };

    if cmd == "keys" {
        for key in scalars::known_keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let mut dock = DockDocument::load_from(&gateway)
        .with_context(|| format!("could not load {}", gateway.path().display()))?;
    let builder = EntryBuilder::default();

    let changed = match cmd {
        "list" => {
            let sections = match opt(sub_m, "section") {
                Some(s) => vec![s.parse::<SectionKey>()?],
                None => SectionKey::ALL.to_vec(),
            };
            for key in sections {
                let entries = dock.entries(key)?;
                if entries.is_empty() {
                    continue;
                }
                println!("{key}:");
                for (i, entry) in entries.iter().enumerate() {
                    println!("{}", entry_line(i, entry));
                }
            }
            false
        }
        "dump" => {
            println!("{}", apple_style_string(&PrefValue::Dictionary(dock.flush()), 0));
            false
        }
        "find" => {
            let query = req(sub_m, "query")?;
            let section = req(sub_m, "section")?;
            let match_on = req(sub_m, "match-on")?.parse::<MatchOn>()?;
            if sub_m.get_flag("all") {
                let found: Vec<String> = dock
                    .find_all(query, section, match_on)?
                    .map(|i| i.to_string())
                    .collect();
                if found.is_empty() {
                    bail!("no entry matches {query:?}");
                }
                println!("{}", found.join(" "));
            } else {
                match dock.find_existing_entry(query, section, match_on)? {
                    Some(i) => println!("{i}"),
                    None => bail!("no entry matches {query:?}"),
                }
            }
            false
        }
        "add-app" => {
            let entry = builder.application(req(sub_m, "path")?, opt(sub_m, "label"))?;
            add(&mut dock, sub_m, req(sub_m, "section")?, entry)?
        }
        "add-other" => {
            let options = FolderOptions {
                arrangement: opt(sub_m, "arrangement").map(str::parse).transpose()?,
                display_as: opt(sub_m, "display-as").map(str::parse).transpose()?,
                show_as: opt(sub_m, "show-as").map(str::parse).transpose()?,
                label: opt(sub_m, "label").map(str::to_string),
            };
            let entry = builder.file_or_folder(req(sub_m, "path")?, options)?;
            add(&mut dock, sub_m, req(sub_m, "section")?, entry)?
        }
        "add-url" => {
            let url = req(sub_m, "url")?;
            if dock.find_existing_url(url).is_some() {
                println!("{url} is already in the Dock");
                false
            } else {
                let entry = builder.url(url, opt(sub_m, "label"))?;
                add(&mut dock, sub_m, SectionKey::PersistentOthers.as_str(), entry)?
            }
        }
        "add-spacer" => {
            let spacer = req(sub_m, "type")?.parse::<SpacerType>()?;
            let entry = builder.spacer_of(spacer);
            add(&mut dock, sub_m, req(sub_m, "section")?, entry)?
        }
        "remove" => {
            let query = req(sub_m, "query")?;
            let match_on = req(sub_m, "match-on")?.parse::<MatchOn>()?;
            let removed = match opt(sub_m, "section") {
                Some(section) if sub_m.get_flag("all") => {
                    dock.remove_all_matching(query, section, match_on)?
                }
                Some(section) => dock.remove_entry(query, section, match_on)?.map_or(0, |_| 1),
                None => dock.remove_from_all_sections(query, match_on).len(),
            };
            println!("removed {removed} entr{}", if removed == 1 { "y" } else { "ies" });
            removed > 0
        }
        "remove-url" => {
            let url = req(sub_m, "url")?;
            let removed = dock.remove_url_entry(url).is_some();
            if !removed {
                println!("{url} is not in the Dock");
            }
            removed
        }
        "replace" => {
            let path = req(sub_m, "path")?;
            let section = req(sub_m, "section")?.parse::<SectionKey>()?;
            let query = match opt(sub_m, "query") {
                Some(q) => q.to_string(),
                None => default_query(path)?,
            };
            let entry = replacement(&builder, section, path, opt(sub_m, "label"))?;
            let match_on = req(sub_m, "match-on")?.parse::<MatchOn>()?;
            if !dock.replace_entry(&query, entry, section, match_on)? {
                bail!("no entry matches {query:?}");
            }
            true
        }
        "get" => {
            let key = req(sub_m, "key")?;
            match dock.scalar(key).or_else(|| dock.passthrough(key)) {
                Some(value) => println!("{}", apple_style_string(value, 0)),
                None => bail!("{key} is not set"),
            }
            false
        }
        "set" => {
            let key = req(sub_m, "key")?;
            let value = parse_scalar(key, req(sub_m, "value")?)?;
            dock.set_scalar(key, value)?;
            true
        }
        other => bail!("unknown subcommand {other}"),
    };

    if changed {
        dock.save_to(&gateway)
            .with_context(|| format!("could not save {}", gateway.path().display()))?;
        println!("OK");
    }
    Ok(())
}

/// Inserts `entry` unless an entry with the same path is already present.
fn add(dock: &mut DockDocument, sub_m: &ArgMatches, section: &str, entry: Entry) -> Result<bool> {
    if let Some(path) = entry.path() {
        if let Some(i) = dock.find_existing_entry(&path, section, MatchAttribute::Path.into())? {
            println!("{path} is already in {section} at index {i}");
            return Ok(false);
        }
    }
    match sub_m.get_one::<usize>("position") {
        Some(&pos) => {
            if !dock.insert_entry(section, pos, entry)? {
                bail!("index {pos} is past the end of {section}");
            }
        }
        None => dock.append_entry(section, entry)?,
    }
    Ok(true)
}

/// Application entry for the app sections, file or folder entry for the others.
fn replacement(builder: &EntryBuilder, section: SectionKey, path: &str, label: Option<&str>) -> Result<Entry> {
    let entry = match section {
        SectionKey::PersistentApps | SectionKey::StaticApps => builder.application(path, label)?,
        SectionKey::PersistentOthers | SectionKey::StaticOthers => builder.file_or_folder(
            path,
            FolderOptions {
                label: label.map(str::to_string),
                ..Default::default()
            },
        )?,
    };
    Ok(entry)
}

/// File name of `path` without its extension.
fn default_query(path: &str) -> Result<String> {
    Path::new(path.trim_end_matches('/'))
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive an entry name from {path:?}"))
}

/// Interprets a command-line value according to the key's domain.
fn parse_scalar(key: &str, raw: &str) -> Result<PrefValue> {
    let value = match scalars::domain_of(key) {
        Some(ScalarDomain::Size) => PrefValue::Float(
            raw.parse::<f64>()
                .with_context(|| format!("{key} expects a number, got {raw:?}"))?,
        ),
        _ => PrefValue::String(raw.to_string()),
    };
    Ok(value)
}

fn req<'a>(sub_m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    opt(sub_m, name).with_context(|| format!("{name} required"))
}

fn opt<'a>(sub_m: &'a ArgMatches, name: &str) -> Option<&'a str> {
    sub_m.get_one::<String>(name).map(String::as_str)
}
