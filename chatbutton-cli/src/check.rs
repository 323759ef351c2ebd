use chatbutton_lib::{
    Result, Site,
    clock::Clock,
    store::SettingsStore,
    visibility::{PageContext, Singular, Verdict, should_show},
};
use chrono::NaiveDateTime;
use colored::Colorize;

#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    #[arg(long)]
    front_page: bool,
    /// The blog posts index
    #[arg(long)]
    posts_index: bool,
    #[arg(long)]
    archive: bool,
    #[arg(long)]
    search: bool,
    #[arg(long)]
    not_found: bool,
    /// Post type of a single-item page
    #[arg(long)]
    post_type: Option<String>,
    /// Id of a single-item page
    #[arg(long)]
    post_id: Option<u64>,
    /// Evaluate at this local time ("YYYY-MM-DD HH:MM") instead of now
    #[arg(long, value_parser = parse_at)]
    at: Option<NaiveDateTime>,
}

impl Args {
    /// A page is singular as soon as it has a post type or id.
    fn page(&self) -> PageContext {
        let singular = (self.post_type.is_some() || self.post_id.is_some()).then(|| Singular {
            post_type: self.post_type.clone().unwrap_or_default(),
            post_id: self.post_id.unwrap_or_default(),
        });

        PageContext {
            is_front_page: self.front_page,
            is_posts_index: self.posts_index,
            is_archive: self.archive,
            is_search: self.search,
            is_not_found: self.not_found,
            singular,
        }
    }
}

pub fn handle<S: SettingsStore, C: Clock>(site: &Site<S, C>, args: &Args) -> Result<()> {
    let page = args.page();
    let verdict = match args.at {
        Some(at) => should_show(&site.settings()?, Ok(at), &page),
        None => site.evaluate(&page)?,
    };

    match verdict {
        Verdict::Shown {
            link,
            label,
            position,
        } => {
            println!("{} {link}", "shown".green().bold());
            if !label.is_empty() {
                println!("label: {label}");
            }
            println!("position: {position}");
        }
        Verdict::Hidden => println!("{}", "hidden".red().bold()),
    }

    Ok(())
}

fn parse_at(value: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
}
