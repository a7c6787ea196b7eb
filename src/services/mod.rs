pub mod batch_coordinator;
pub mod chain_orchestrator;
pub mod generation_service;
pub mod model_service;
pub mod orchestrator_steps;
pub mod prompt_helpers;
pub mod response_validator;
pub mod retry_controller;
pub mod step_executor;
