use chatbutton_lib::{
    Result, Site,
    clock::Clock,
    settings::{RawInput, Tab},
    store::SettingsStore,
};

use crate::print_settings;

#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    /// The tab being saved: general, messages, schedule or visibility
    tab: String,
    /// Tick the "enabled" toggle. Leaving it out unticks it
    #[arg(long)]
    enabled: bool,
    #[arg(long)]
    phone: Option<String>,
    /// left or right
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    label: Option<String>,
    /// Pre-filled chat message
    #[arg(long)]
    message: Option<String>,
    /// Active weekday, 1 (Monday) to 7 (Sunday). Repeatable
    #[arg(long = "day")]
    days: Vec<String>,
    /// Window start, HH:MM
    #[arg(long)]
    from: Option<String>,
    /// Window end, HH:MM
    #[arg(long)]
    to: Option<String>,
    /// Post type to hide the button on. Repeatable
    #[arg(long = "exclude-type")]
    exclude_types: Vec<String>,
    /// Post or page id to hide the button on. Repeatable
    #[arg(long = "exclude-id")]
    exclude_ids: Vec<String>,
    /// front_page, posts_page, archive, search or 404. Repeatable
    #[arg(long = "exclude-special")]
    exclude_special: Vec<String>,
}

impl Args {
    /// The form payload the settings page would post for these arguments.
    fn raw_input(&self) -> RawInput {
        RawInput {
            enabled: self.enabled.then(|| "1".to_owned()),
            phone: self.phone.clone(),
            position: self.position.clone(),
            label: self.label.clone(),
            default_message: self.message.clone(),
            // Unticked checkboxes are never posted
            active_days: non_empty(&self.days),
            time_from: self.from.clone(),
            time_to: self.to.clone(),
            exclude_post_types: non_empty(&self.exclude_types),
            exclude_page_ids: non_empty(&self.exclude_ids),
            exclude_special: non_empty(&self.exclude_special),
            ..Default::default()
        }
    }
}

pub fn handle<S: SettingsStore, C: Clock>(site: &Site<S, C>, args: &Args) -> Result<()> {
    let tab = Tab::from_query(&args.tab);
    let settings = site.submit(&args.raw_input(), tab.flags())?;

    println!("Saved {tab} settings");
    print_settings(&settings)
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
