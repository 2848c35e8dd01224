use anyhow::Result;

use super::{print_application_detail, print_application_line, Command, CommandContext};
use rail_concession::workflows::{ApplicationId, ApplicationStatus, ConcessionApplication};

fn report(application: &ConcessionApplication) {
    let icon = match application.status() {
        ApplicationStatus::Rejected => "❌",
        ApplicationStatus::RailwayApproved => "🎫",
        _ => "✅",
    };
    println!(
        "{icon} Application {} is now {}",
        application.id(),
        application.status().label()
    );
    println!();
    print_application_detail(application);
}

pub struct ApproveCommand {
    id: ApplicationId,
    remarks: Option<String>,
}

impl ApproveCommand {
    pub fn new(id: String, remarks: Option<String>) -> Self {
        Self {
            id: ApplicationId::from(id),
            remarks,
        }
    }
}

impl Command for ApproveCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let application = ctx
            .workflow
            .approve(&self.id, &actor, self.remarks.as_deref())
            .await?;
        report(&application);
        Ok(())
    }
}

pub struct RejectCommand {
    id: ApplicationId,
    reason: Option<String>,
}

impl RejectCommand {
    pub fn new(id: String, reason: Option<String>) -> Self {
        Self {
            id: ApplicationId::from(id),
            reason,
        }
    }
}

impl Command for RejectCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let application = ctx
            .workflow
            .reject(&self.id, &actor, self.reason.as_deref())
            .await?;
        report(&application);
        Ok(())
    }
}

pub struct TransitionCommand {
    id: ApplicationId,
    target: ApplicationStatus,
    reason: Option<String>,
}

impl TransitionCommand {
    pub fn new(id: String, target: ApplicationStatus, reason: Option<String>) -> Self {
        Self {
            id: ApplicationId::from(id),
            target,
            reason,
        }
    }
}

impl Command for TransitionCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let application = ctx
            .workflow
            .transition(&self.id, self.target, &actor, self.reason.as_deref())
            .await?;
        report(&application);
        Ok(())
    }
}

pub struct QueueCommand;

impl Command for QueueCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor().await?;
        let Some(status) = actor.role.review_queue_status() else {
            println!("📭 Students have no review queue; try 'concession history'");
            return Ok(());
        };

        let queue = ctx.workflow.review_queue(&actor).await?;
        println!("📋 REVIEW QUEUE ({})", status.label());
        println!("──────────────");
        if queue.is_empty() {
            println!("📭 Nothing waiting for review");
            return Ok(());
        }
        println!("📊 {} applications waiting", queue.len());
        for application in &queue {
            print_application_line(application);
        }
        Ok(())
    }
}
