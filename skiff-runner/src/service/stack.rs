//! Stack lifecycle service
//!
//! Handles the job's infrastructure stacks including:
//! - Rendering and submitting the job stack
//! - Submitting the self-expiring failsafe stack
//! - Resolving the physical resource handles a task needs
//! - Deleting both stacks at teardown

use skiff_client::StackOrchestrator;
use skiff_core::domain::job::{JobIdentity, JobRequest};
use skiff_core::domain::stack::{ResourceHandles, StackRef, StackSet, TaskDef, logical_id};
use skiff_core::dto::stack::{Capability, Parameter, StackResource, SubmitStack, physical_id_of};
use skiff_template::{parameters, render};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::RunnerConfig;
use crate::error::{JobFailure, Result, TeardownError};
use crate::templates::Templates;

/// Provisions and tears down the stacks of a job
pub struct StackService {
    stacks: Arc<dyn StackOrchestrator>,
    templates: Templates,
    base_stack: String,
    failsafe_ttl_minutes: u32,
    await_failsafe_deletion: bool,
}

impl StackService {
    /// Creates a new stack service
    ///
    /// # Arguments
    /// * `stacks` - The stack orchestrator backend
    /// * `templates` - Job and failsafe templates
    /// * `config` - Runner configuration (base stack, TTL, teardown waits)
    pub fn new(
        stacks: Arc<dyn StackOrchestrator>,
        templates: Templates,
        config: &RunnerConfig,
    ) -> Self {
        Self {
            stacks,
            templates,
            base_stack: config.base_stack.clone(),
            failsafe_ttl_minutes: config.failsafe_ttl_minutes,
            await_failsafe_deletion: config.await_failsafe_deletion,
        }
    }

    /// Stacks a job owns, derived from its build id
    pub fn stack_set(&self, identity: &JobIdentity) -> StackSet {
        StackSet::for_job(&self.base_stack, &identity.build_id)
    }

    /// Renders and submits the job's stacks, then resolves its resources
    ///
    /// Handles that cannot be found are left empty; the stage that needs one
    /// fails with [`JobFailure::UnresolvedHandle`].
    ///
    /// # Errors
    /// Returns an error if:
    /// - The job template cannot be rendered (nothing is submitted)
    /// - A stack cannot be submitted
    /// - Stack resources cannot be described
    pub async fn provision(
        &self,
        stacks: &StackSet,
        identity: &JobIdentity,
        request: &JobRequest,
    ) -> Result<TaskDef> {
        let main_template = render(&self.templates.main, &request.secrets, &request.environment)?;
        debug!("Job stack template:\n{}", main_template);

        self.submit(self.main_submission(stacks, identity, request, &main_template))
            .await?;
        info!("Creating job stack {}", stacks.main);

        let failsafe_template = self.templates.failsafe.clone();
        self.submit(self.failsafe_submission(stacks, identity, &failsafe_template))
            .await?;
        info!(
            "Creating failsafe stack {} (TTL {} minutes)",
            stacks.failsafe, self.failsafe_ttl_minutes
        );

        if let Err(e) = self.stacks.wait_ready(stacks.main.as_str()).await {
            error!("Job stack {} did not become ready: {}", stacks.main, e);
        }

        let job_resources = self.describe(&stacks.main).await?;
        let base_resources = self.describe(&stacks.base).await?;

        let handles = ResourceHandles {
            cluster: physical_id_of(&base_resources, logical_id::CLUSTER),
            task_definition: physical_id_of(&job_resources, logical_id::TASK_DEFINITION),
            subnet_one: physical_id_of(&base_resources, logical_id::SUBNET_ONE),
            subnet_two: physical_id_of(&base_resources, logical_id::SUBNET_TWO),
            security_group: physical_id_of(&base_resources, logical_id::SECURITY_GROUP),
            log_stream: physical_id_of(&job_resources, logical_id::LOG_STREAM),
        };

        info!("Job stack ready (not waiting for the failsafe stack)");

        Ok(TaskDef {
            stacks: stacks.clone(),
            main_template,
            failsafe_template,
            sentinel: identity.sentinel.clone(),
            handles,
        })
    }

    /// Deletes both job stacks
    ///
    /// Every step is attempted even if an earlier one failed; a stack whose
    /// deletion request failed is not waited for.
    pub async fn teardown(&self, stacks: &StackSet) -> std::result::Result<(), TeardownError> {
        let mut failures = Vec::new();
        let mut deleting = Vec::new();

        for stack in stacks.owned() {
            match self.stacks.delete(stack.as_str()).await {
                Ok(()) => {
                    info!("Deleting stack {}", stack);
                    deleting.push(stack);
                }
                Err(e) => failures.push(format!("delete {}: {}", stack, e)),
            }
        }

        for stack in deleting {
            if *stack == stacks.failsafe && !self.await_failsafe_deletion {
                debug!("Not waiting for deletion of {}", stack);
                continue;
            }
            match self.stacks.wait_deleted(stack.as_str()).await {
                Ok(()) => info!("Stack {} deleted", stack),
                Err(e) => failures.push(format!("wait for deletion of {}: {}", stack, e)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            for failure in &failures {
                warn!("Teardown step failed: {}", failure);
            }
            Err(TeardownError(failures))
        }
    }

    fn main_submission(
        &self,
        stacks: &StackSet,
        identity: &JobIdentity,
        request: &JobRequest,
        template: &str,
    ) -> SubmitStack {
        let commands = request.commands_with_sentinel(&identity.sentinel);

        let mut params = vec![
            Parameter::new(parameters::IMAGE_URL, &request.image),
            Parameter::new(parameters::SERVICE_NAME, stacks.main.as_str()),
            Parameter::new(parameters::COMMAND, commands.join(",")),
            Parameter::new(parameters::ENTRY_POINT, request.entrypoint.join(",")),
            Parameter::new(parameters::WORKING_DIRECTORY, &request.working_dir),
            Parameter::new(parameters::MOUNT_DIRECTORY, &request.mount_dir),
            Parameter::new(parameters::BUILD_ID, &identity.build_id),
        ];
        params.extend(
            request
                .secrets
                .iter()
                .map(|s| Parameter::new(s.sanitized_key(), &s.parameter_value)),
        );

        SubmitStack {
            name: stacks.main.name.clone(),
            template_body: template.to_string(),
            parameters: params,
            capabilities: vec![],
        }
    }

    fn failsafe_submission(
        &self,
        stacks: &StackSet,
        identity: &JobIdentity,
        template: &str,
    ) -> SubmitStack {
        SubmitStack {
            name: stacks.failsafe.name.clone(),
            template_body: template.to_string(),
            parameters: vec![
                Parameter::new(parameters::STACK_NAME, stacks.main.as_str()),
                Parameter::new(parameters::DELETE_STACK_NAME, stacks.failsafe.as_str()),
                Parameter::new(parameters::TTL, self.failsafe_ttl_minutes.to_string()),
                Parameter::new(parameters::BUILD_ID, &identity.build_id),
            ],
            capabilities: vec![Capability::CapabilityIam],
        }
    }

    async fn submit(&self, request: SubmitStack) -> Result<()> {
        let name = request.name.clone();
        self.stacks
            .submit(request)
            .await
            .map_err(|e| JobFailure::Provisioning(format!("failed to submit stack {}: {}", name, e)))
    }

    async fn describe(&self, stack: &StackRef) -> Result<Vec<StackResource>> {
        self.stacks
            .describe_resources(stack.as_str())
            .await
            .map_err(|e| {
                JobFailure::Provisioning(format!("failed to describe stack {}: {}", stack, e))
            })
    }
}
