use anyhow::Result;

use super::{print_application_detail, print_application_line, Command, CommandContext};
use rail_concession::storage::ApplicationStore;
use rail_concession::workflows::{ApplicationId, ApplicationStatus, Role, WorkflowError};

pub struct HistoryCommand;

impl Command for HistoryCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let applications = if actor.role == Role::Student {
            ctx.workflow.list_for_owner(&actor.id).await?
        } else {
            ctx.workflow.store().list_all().await?
        };

        println!("🗂️  APPLICATIONS");
        println!("──────────────");
        if applications.is_empty() {
            println!("📭 No applications yet");
            return Ok(());
        }
        for application in &applications {
            print_application_line(application);
        }
        Ok(())
    }
}

pub struct ShowCommand {
    id: ApplicationId,
    json: bool,
}

impl ShowCommand {
    pub fn new(id: String, json: bool) -> Self {
        Self {
            id: ApplicationId::from(id),
            json,
        }
    }
}

impl Command for ShowCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let application = ctx.workflow.get(&self.id).await?;

        // Students only see their own applications
        if actor.role == Role::Student && application.user_id() != &actor.id {
            return Err(WorkflowError::NotFound(self.id.clone()).into());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&application)?);
        } else {
            print_application_detail(&application);
            let next = ctx.workflow.available_transitions(&application, &actor);
            if !next.is_empty() {
                let names: Vec<_> = next.iter().map(|s| s.as_str()).collect();
                println!();
                println!("💡 You can move this to: {}", names.join(", "));
            }
        }
        Ok(())
    }
}

pub struct StatusCommand;

impl Command for StatusCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;

        if actor.role == Role::Student {
            let now = ctx.workflow.now();
            let summary = ctx.workflow.summary_for_owner(&actor.id, now).await?;
            println!("📊 CONCESSION STATUS");
            println!("====================");
            println!("   🎯 Total:    {}", summary.total);
            println!("   ⏳ Pending:  {}", summary.pending);
            println!("   ✅ Approved: {}", summary.approved);
            println!("   ❌ Rejected: {}", summary.rejected);
            println!();
            match &summary.active_pass {
                Some(pass) => {
                    let days = pass.validity().days_remaining(now);
                    println!("🎫 Active pass: {} ({} days left)", pass.id(), days);
                    if let Some(token) = pass.state().pass_token() {
                        println!("   Pass number: {token}");
                    }
                }
                None => println!("🎫 No active pass"),
            }
            return Ok(());
        }

        let all = ctx.workflow.store().list_all().await?;
        let queue = ctx.workflow.review_queue(&actor).await?;
        println!("📊 REVIEW STATUS ({})", actor.role);
        println!("====================");
        println!("   📋 Waiting on you: {}", queue.len());
        for status in ApplicationStatus::ALL {
            let count = all.iter().filter(|a| a.status() == status).count();
            println!("   {:<17} {}", status.label(), count);
        }
        Ok(())
    }
}
