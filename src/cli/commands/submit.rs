use anyhow::Result;

use super::{print_application_detail, Command, CommandContext};
use crate::cli::JourneyArgs;
use rail_concession::workflows::{Itinerary, NewApplication, StudentProfile};

pub struct SubmitCommand {
    journey: JourneyArgs,
}

impl SubmitCommand {
    pub fn new(journey: JourneyArgs) -> Self {
        Self { journey }
    }

    fn request(&self, profile: StudentProfile) -> NewApplication {
        let itinerary = Itinerary::new(
            self.journey.source.clone(),
            self.journey.destination.clone(),
            self.journey.travel_class,
            self.journey.duration,
        );
        let mut request = NewApplication::new(itinerary).with_profile(profile);
        if let Some(reason) = self.journey.reason.as_deref().filter(|r| !r.trim().is_empty()) {
            request = request.with_reason(reason.trim());
        }
        if let Some(uri) = &self.journey.college_id_uri {
            request = request.with_college_id_uri(uri.clone());
        }
        request
    }
}

impl Command for SubmitCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let request = self.request(session.profile_or_default());

        let application = ctx
            .workflow
            .submit_application(request, &session.actor)
            .await?;

        println!("✅ Application submitted");
        println!();
        print_application_detail(&application);
        Ok(())
    }
}
