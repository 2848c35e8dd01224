use anyhow::Result;

use super::{print_application_detail, Command, CommandContext};
use crate::cli::{DraftAction, DraftArgs};
use rail_concession::storage::ApplicationDraft;

pub struct DraftCommand {
    action: DraftAction,
}

impl DraftCommand {
    pub fn new(action: DraftAction) -> Self {
        Self { action }
    }
}

fn to_draft(args: &DraftArgs) -> ApplicationDraft {
    ApplicationDraft {
        source_station: args.source.clone(),
        destination_station: args.destination.clone(),
        travel_class: args.travel_class,
        duration: args.duration,
        reason: args.reason.clone(),
        college_id_uri: args.college_id_uri.clone(),
    }
}

fn print_draft(draft: &ApplicationDraft) {
    let unset = "(not set)".to_string();
    println!("📝 Draft application");
    println!(
        "   From:     {}",
        draft.source_station.as_ref().unwrap_or(&unset)
    );
    println!(
        "   To:       {}",
        draft.destination_station.as_ref().unwrap_or(&unset)
    );
    println!(
        "   Class:    {}",
        draft.travel_class.map(|c| c.to_string()).unwrap_or_else(|| unset.clone())
    );
    println!(
        "   Duration: {}",
        draft.duration.map(|d| d.to_string()).unwrap_or_else(|| unset.clone())
    );
    if let Some(reason) = &draft.reason {
        println!("   Reason:   {reason}");
    }
    if let Some(uri) = &draft.college_id_uri {
        println!("   ID card:  {uri}");
    }
}

impl Command for DraftCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let workflow = &ctx.workflow;

        match &self.action {
            DraftAction::Save { journey } => {
                let draft = workflow.save_draft(&session.actor, to_draft(journey)).await?;
                println!("💾 Draft saved");
                print_draft(&draft);
            }
            DraftAction::Show => match workflow.load_draft(&session.actor).await? {
                Some(draft) => print_draft(&draft),
                None => println!("📭 No saved draft"),
            },
            DraftAction::Discard => {
                workflow.discard_draft(&session.actor).await?;
                println!("🗑️  Draft discarded");
            }
            DraftAction::Submit => {
                let application = workflow
                    .submit_draft(&session.actor, session.profile_or_default())
                    .await?;
                println!("✅ Draft submitted");
                println!();
                print_application_detail(&application);
            }
        }
        Ok(())
    }
}
