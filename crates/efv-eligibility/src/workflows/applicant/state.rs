use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationStatus, ApplicationTracking, Consent, CraVerification, DisabilityApplication,
    PersonalInfo, UserProfile, WizardStep,
};

/// Everything the applicant has entered or been issued during one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub user: Option<UserProfile>,
    pub personal_info: Option<PersonalInfo>,
    pub disability_application: Option<DisabilityApplication>,
    pub consent: Option<Consent>,
    pub tracking: Option<ApplicationTracking>,
    pub cra_verification: Option<CraVerification>,
    pub current_step: WizardStep,
}

/// Wholesale replacements applied to [`ApplicationState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationAction {
    SetUser(Option<UserProfile>),
    SetPersonalInfo(PersonalInfo),
    SetDisabilityApplication(DisabilityApplication),
    SetConsent(Consent),
    SetTracking(ApplicationTracking),
    SetCraVerification(CraVerification),
    SetCurrentStep(WizardStep),
    AdvanceTrackingStatus(ApplicationStatus),
    Reset,
}

impl ApplicationState {
    pub fn reduce(self, action: ApplicationAction) -> ApplicationState {
        match action {
            ApplicationAction::SetUser(user) => Self { user, ..self },
            ApplicationAction::SetPersonalInfo(info) => Self {
                personal_info: Some(info),
                ..self
            },
            ApplicationAction::SetDisabilityApplication(application) => Self {
                disability_application: Some(application),
                ..self
            },
            ApplicationAction::SetConsent(consent) => Self {
                consent: Some(consent),
                ..self
            },
            ApplicationAction::SetTracking(tracking) => Self {
                tracking: Some(tracking),
                ..self
            },
            ApplicationAction::SetCraVerification(verification) => Self {
                cra_verification: Some(verification),
                ..self
            },
            ApplicationAction::SetCurrentStep(current_step) => Self {
                current_step,
                ..self
            },
            ApplicationAction::AdvanceTrackingStatus(status) => {
                let tracking = self.tracking.map(|mut tracking| {
                    if tracking.status.can_transition_to(status) {
                        tracking.status = status;
                    }
                    tracking
                });
                Self { tracking, ..self }
            }
            ApplicationAction::Reset => ApplicationState::default(),
        }
    }

    /// Personal, disability and consent records are all present.
    pub fn ready_for_submission(&self) -> bool {
        self.personal_info.is_some()
            && self.disability_application.is_some()
            && self.consent.is_some()
    }

    pub fn ready_for_review(&self) -> bool {
        self.ready_for_submission() && self.cra_verification.is_some()
    }
}

/// Explicit container for one session's [`ApplicationState`].
///
/// Setters replace their field wholesale and never validate; callers validate before writing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStore {
    state: ApplicationState,
}

impl ApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    pub fn dispatch(&mut self, action: ApplicationAction) {
        let previous = std::mem::take(&mut self.state);
        self.state = previous.reduce(action);
    }

    pub fn set_user(&mut self, user: Option<UserProfile>) {
        self.dispatch(ApplicationAction::SetUser(user));
    }

    pub fn set_personal_info(&mut self, info: PersonalInfo) {
        self.dispatch(ApplicationAction::SetPersonalInfo(info));
    }

    pub fn set_disability_application(&mut self, application: DisabilityApplication) {
        self.dispatch(ApplicationAction::SetDisabilityApplication(application));
    }

    pub fn set_consent(&mut self, consent: Consent) {
        self.dispatch(ApplicationAction::SetConsent(consent));
    }

    pub fn set_tracking(&mut self, tracking: ApplicationTracking) {
        self.dispatch(ApplicationAction::SetTracking(tracking));
    }

    pub fn set_cra_verification(&mut self, verification: CraVerification) {
        self.dispatch(ApplicationAction::SetCraVerification(verification));
    }

    pub fn set_current_step(&mut self, step: WizardStep) {
        self.dispatch(ApplicationAction::SetCurrentStep(step));
    }

    pub fn update_tracking_status(&mut self, status: ApplicationStatus) {
        self.dispatch(ApplicationAction::AdvanceTrackingStatus(status));
    }

    /// Clear every entity and the signed-in user together.
    pub fn reset(&mut self) {
        self.dispatch(ApplicationAction::Reset);
    }
}
