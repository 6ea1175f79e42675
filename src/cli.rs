// SPDX-License-Identifier: MIT

//! CLI definition for dockprefs.
//
// Only the clap command tree lives here; `main.rs` maps matches onto the library.
use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let section = |default: Option<&'static str>| {
        let mut a = Arg::new("section")
            .short('s')
            .long("section")
            .value_name("SECTION")
            .value_parser([
                "persistent-apps",
                "persistent-others",
                "static-apps",
                "static-others",
            ])
            .help("Dock section");
        if let Some(d) = default {
            a = a.default_value(d);
        }
        a
    };

    let match_on = Arg::new("match-on")
        .short('m')
        .long("match-on")
        .value_name("ATTR")
        .value_parser(["any", "label", "path", "name_ext", "name_noext"])
        .default_value("any")
        .help("Entry attribute to compare the query against");

    let position = Arg::new("position")
        .short('p')
        .long("position")
        .value_name("INDEX")
        .value_parser(clap::value_parser!(usize))
        .help("Insert at this index instead of appending");

    let label = Arg::new("label")
        .short('l')
        .long("label")
        .value_name("LABEL")
        .help("Display label");

    let query = Arg::new("query")
        .help("Label, path or file name of the entry")
        .required(true)
        .index(1);

    Command::new("dockprefs")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PLIST")
                .global(true)
                .help("Edit this plist file instead of the current user's Dock preferences"),
        )
        .arg(
            Arg::new("no-restart")
                .short('n')
                .long("no-restart")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Do not restart the Dock after saving"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log output (-v info, -vv debug)"),
        )
        .subcommand(
            Command::new("list")
                .about("List Dock entries")
                .arg(section(None)),
        )
        .subcommand(Command::new("dump").about("Print the whole preference store"))
        .subcommand(
            Command::new("find")
                .about("Print the index of the first matching entry")
                .arg(&query)
                .arg(section(Some("persistent-apps")))
                .arg(&match_on)
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Print every matching index"),
                ),
        )
        .subcommand(
            Command::new("add-app")
                .about("Add an application")
                .arg(
                    Arg::new("path")
                        .help("Absolute path of the .app bundle")
                        .required(true)
                        .index(1),
                )
                .arg(&label)
                .arg(section(Some("persistent-apps")))
                .arg(&position),
        )
        .subcommand(
            Command::new("add-other")
                .about("Add a file or folder")
                .arg(
                    Arg::new("path")
                        .help("Absolute path of the file or folder")
                        .required(true)
                        .index(1),
                )
                .arg(&label)
                .arg(
                    Arg::new("arrangement")
                        .long("arrangement")
                        .value_parser(["name", "date-added", "date-modified", "date-created", "kind"])
                        .help("Sort order of the folder's contents"),
                )
                .arg(
                    Arg::new("display-as")
                        .long("display-as")
                        .value_parser(["stack", "folder"])
                        .help("Show the folder as a stack or a folder icon"),
                )
                .arg(
                    Arg::new("show-as")
                        .long("show-as")
                        .value_parser(["auto", "fan", "grid", "list"])
                        .help("How the folder opens"),
                )
                .arg(section(Some("persistent-others")))
                .arg(&position),
        )
        .subcommand(
            Command::new("add-url")
                .about("Add a URL")
                .arg(Arg::new("url").help("URL to open").required(true).index(1))
                .arg(&label)
                .arg(&position),
        )
        .subcommand(
            Command::new("add-spacer")
                .about("Add a spacer")
                .arg(
                    Arg::new("type")
                        .short('t')
                        .long("type")
                        .value_parser(["spacer-tile", "small-spacer-tile", "flex-spacer-tile"])
                        .default_value("spacer-tile"),
                )
                .arg(section(Some("persistent-apps")))
                .arg(&position),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove an entry (from every section unless one is given)")
                .arg(&query)
                .arg(section(None))
                .arg(&match_on)
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .requires("section")
                        .help("Remove every match, not only the first"),
                ),
        )
        .subcommand(
            Command::new("remove-url")
                .about("Remove a URL entry")
                .arg(Arg::new("url").help("Exact URL").required(true).index(1)),
        )
        .subcommand(
            Command::new("replace")
                .about("Replace an entry, keeping its position")
                .long_about(
                    "Replace an entry, keeping its position. In the app sections the replacement \
                     is an application; elsewhere it is a file or folder. Without a query the \
                     entry named like the new path (minus its extension) is replaced.",
                )
                .arg(
                    Arg::new("path")
                        .help("Absolute path of the replacement")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("query")
                        .help("Label, path or file name of the entry to replace")
                        .index(2),
                )
                .arg(&label)
                .arg(section(Some("persistent-apps")))
                .arg(match_on),
        )
        .subcommand(
            Command::new("get")
                .about("Read a Dock preference")
                .arg(Arg::new("key").help("Preference key").required(true).index(1)),
        )
        .subcommand(
            Command::new("set")
                .about("Change a Dock preference")
                .arg(Arg::new("key").help("Preference key").required(true).index(1))
                .arg(
                    Arg::new("value")
                        .help("New value (true/false/yes/no for flags)")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(Command::new("keys").about("List the preference keys dockprefs understands"))
}
