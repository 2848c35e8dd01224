use anyhow::Result;

use super::{Command, CommandContext};
use crate::cli::ProfileArgs;
use rail_concession::workflows::{Actor, Role, StudentProfile};

pub struct LoginCommand {
    role: Role,
    id: String,
    profile: ProfileArgs,
}

impl LoginCommand {
    pub fn new(role: Role, id: String, profile: ProfileArgs) -> Self {
        Self { role, id, profile }
    }

    fn actor(&self) -> Actor {
        let actor = Actor::new(self.id.trim(), self.role);
        match (&self.profile.college, self.role) {
            (Some(college), Role::CollegeAdmin) => actor.with_college(college.trim()),
            _ => actor,
        }
    }

    fn student_profile(&self) -> StudentProfile {
        let field = |value: &Option<String>| value.as_deref().unwrap_or("").trim().to_string();
        StudentProfile {
            student_name: field(&self.profile.name),
            college_name: field(&self.profile.college),
            department: field(&self.profile.department),
            year: field(&self.profile.year),
            prn: field(&self.profile.prn),
        }
    }
}

impl Command for LoginCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("User id must not be empty");
        }

        let session = ctx
            .sessions
            .login(self.actor(), Some(self.student_profile()))
            .await?;

        println!(
            "🔑 Logged in as {} ({})",
            session.actor.id, session.actor.role
        );
        if let Some(profile) = &session.profile {
            if !profile.is_complete() {
                println!("   ⚠️  Profile incomplete; reviewers see name, college, department, year and PRN");
            }
        }
        Ok(())
    }
}

pub struct LogoutCommand;

impl Command for LogoutCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        ctx.sessions.logout().await?;
        println!("👋 Logged out");
        Ok(())
    }
}

pub struct WhoamiCommand;

impl Command for WhoamiCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(session) = ctx.sessions.current_session().await? else {
            println!("Not logged in");
            return Ok(());
        };

        println!("👤 {} ({})", session.actor.id, session.actor.role);
        if let Some(college) = &session.actor.college {
            println!("   Reviews for: {college}");
        }
        if let Some(profile) = &session.profile {
            if !profile.student_name.is_empty() {
                println!("   Name:       {}", profile.student_name);
            }
            if !profile.college_name.is_empty() {
                println!("   College:    {}", profile.college_name);
            }
            if !profile.department.is_empty() {
                println!("   Department: {}", profile.department);
            }
            if !profile.year.is_empty() {
                println!("   Year:       {}", profile.year);
            }
            if !profile.prn.is_empty() {
                println!("   PRN:        {}", profile.prn);
            }
        }
        Ok(())
    }
}
