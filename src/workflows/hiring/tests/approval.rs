use crate::workflows::hiring::domain::{ApprovalDecision, ApprovalStatus};
use crate::workflows::hiring::offer::approval::ApprovalError;
use crate::workflows::hiring::repository::OutboundIntent;
use crate::workflows::hiring::service::PipelineServiceError;

use super::common::{
    application_at_offer, approval, build_service, drafted_offer, now,
};

#[test]
fn a_single_approval_leaves_the_quorum_pending() {
    let (service, _, intents) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-1");
    let offer = drafted_offer(&service, &application);
    let emitted_before = intents.events().len();

    let updated = service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    assert_eq!(updated.approval_status, ApprovalStatus::Pending);
    assert_eq!(updated.approvals.len(), 1);
    // No candidate notification until the quorum settles.
    assert_eq!(intents.events().len(), emitted_before);
}

#[test]
fn the_full_quorum_approves_the_offer() {
    let (service, _, intents) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-2");
    let offer = drafted_offer(&service, &application);

    service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    let updated = service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    assert_eq!(updated.approval_status, ApprovalStatus::Approved);

    assert!(intents.events().iter().any(|intent| matches!(
        intent,
        OutboundIntent::NotifyCandidate { template, .. } if template == "offer_approved"
    )));
}

#[test]
fn quorum_outcome_does_not_depend_on_decision_order() {
    let (service, _, _) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-3");
    let offer = drafted_offer(&service, &application);

    service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    let updated = service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    assert_eq!(updated.approval_status, ApprovalStatus::Approved);
}

#[test]
fn one_rejection_settles_the_offer_immediately() {
    let (service, _, intents) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-4");
    let offer = drafted_offer(&service, &application);

    let updated = service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Rejected),
            now(),
        )
        .expect("decision recorded");
    assert_eq!(updated.approval_status, ApprovalStatus::Rejected);

    assert!(intents.events().iter().any(|intent| matches!(
        intent,
        OutboundIntent::NotifyCandidate { template, .. } if template == "offer_rejected"
    )));
}

#[test]
fn a_rejection_after_an_approval_still_settles_rejected() {
    let (service, _, _) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-8");
    let offer = drafted_offer(&service, &application);

    service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    let updated = service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Rejected),
            now(),
        )
        .expect("decision recorded");
    assert_eq!(updated.approval_status, ApprovalStatus::Rejected);
}

#[test]
fn settled_offers_accept_no_further_decisions() {
    let (service, _, _) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-5");
    let offer = drafted_offer(&service, &application);

    service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Rejected),
            now(),
        )
        .expect("decision recorded");
    let result = service.record_offer_approval(
        &offer.id,
        approval("hr-001", "hr_manager", ApprovalDecision::Approved),
        now(),
    );
    assert!(matches!(
        result,
        Err(PipelineServiceError::Approval(ApprovalError::NotPending(
            ApprovalStatus::Rejected
        )))
    ));
}

#[test]
fn roles_outside_the_quorum_are_refused() {
    let (service, _, _) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-6");
    let offer = drafted_offer(&service, &application);

    let result = service.record_offer_approval(
        &offer.id,
        approval("ceo-001", "chief_executive", ApprovalDecision::Approved),
        now(),
    );
    assert!(matches!(
        result,
        Err(PipelineServiceError::Approval(ApprovalError::RoleNotRequired(_)))
    ));
}

#[test]
fn each_role_decides_at_most_once() {
    let (service, _, _) = build_service();
    let application = application_at_offer(&service, "REQ-APPR-7");
    let offer = drafted_offer(&service, &application);

    service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("decision recorded");
    let result = service.record_offer_approval(
        &offer.id,
        approval("hr-002", "hr_manager", ApprovalDecision::Approved),
        now(),
    );
    assert!(matches!(
        result,
        Err(PipelineServiceError::Approval(ApprovalError::RoleAlreadyDecided(_)))
    ));
}
