//! Runs task commands as child processes and reports their lifecycle.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use fast_tasks_core::api::{
    ExecutionControl, ExecutionHandle, ExecutionSpec, LifecycleEvent, TaskDescriptor,
    TaskExecutor, TaskRef,
};
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};

use crate::workspace::LocalWorkspace;

pub struct ProcessExecutor {
    workspace: Arc<LocalWorkspace>,
    queue_capacity: usize,
    /// Child output goes to our own stdout/stderr when set.
    inherit_output: bool,
    lifecycle_tx: Mutex<Option<mpsc::Sender<LifecycleEvent>>>,
}

impl ProcessExecutor {
    pub fn new(workspace: Arc<LocalWorkspace>, queue_capacity: usize) -> Self {
        Self {
            workspace,
            queue_capacity: queue_capacity.max(1),
            inherit_output: true,
            lifecycle_tx: Mutex::new(None),
        }
    }

    pub fn with_inherited_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    fn command(&self, task: &TaskDescriptor) -> anyhow::Result<Command> {
        let Some(spec) = &task.execution else {
            anyhow::bail!("task \"{}\" has no command to run", task.name);
        };
        let mut cmd = match spec {
            ExecutionSpec::Shell { command_line } => shell_command(command_line),
            ExecutionSpec::Process { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
        };
        if let Some(dir) = self.workspace.root_path(task.scope()) {
            cmd.current_dir(dir);
        }
        let output = || {
            if self.inherit_output {
                Stdio::inherit()
            } else {
                Stdio::null()
            }
        };
        cmd.stdin(Stdio::null()).stdout(output()).stderr(output());
        // Own process group, so an interrupt reaches the whole pipeline and
        // not our terminal.
        #[cfg(unix)]
        cmd.process_group(0);
        Ok(cmd)
    }

    async fn emit(&self, event: LifecycleEvent) {
        let tx = self.lifecycle_tx.lock().clone();
        if let Some(tx) = tx {
            if tx.send(event).await.is_err() {
                tracing::debug!("lifecycle subscriber went away");
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(not(unix))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

#[async_trait]
impl TaskExecutor for ProcessExecutor {
    async fn execute(&self, task: &TaskDescriptor) -> anyhow::Result<()> {
        let mut child = self.command(task)?.spawn()?;
        let execution_id = uuid::Uuid::new_v4().to_string();
        let task_ref = TaskRef::from(task);
        let (kill_tx, kill_rx) = oneshot::channel();

        let control = ChildControl {
            pid: child.id(),
            kill_tx: Mutex::new(Some(kill_tx)),
        };
        tracing::info!(task = %task.key(), execution = %execution_id, pid = ?child.id(), "task started");
        self.emit(LifecycleEvent::ProcessStarted {
            task: task_ref.clone(),
            handle: ExecutionHandle::new(&execution_id, cfg!(unix), Arc::new(control)),
        })
        .await;

        let tx = self.lifecycle_tx.lock().clone();
        tokio::spawn(async move {
            let exit_code = wait_child(&mut child, kill_rx).await;
            tracing::info!(task = %task_ref.key(), execution = %execution_id, exit_code, "task ended");
            if let Some(tx) = tx {
                let _ = tx
                    .send(LifecycleEvent::ProcessEnded {
                        task: task_ref,
                        execution_id: Some(execution_id),
                        exit_code,
                    })
                    .await;
            }
        });
        Ok(())
    }

    fn subscribe_lifecycle(&self) -> anyhow::Result<mpsc::Receiver<LifecycleEvent>> {
        let mut slot = self.lifecycle_tx.lock();
        if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
            anyhow::bail!("lifecycle events already have a subscriber");
        }
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        *slot = Some(tx);
        Ok(rx)
    }
}

async fn wait_child(child: &mut Child, kill_rx: oneshot::Receiver<()>) -> i32 {
    let status = tokio::select! {
        status = child.wait() => status,
        Ok(()) = kill_rx => {
            if let Err(e) = child.start_kill() {
                tracing::warn!("failed to kill task process: {e}");
            }
            child.wait().await
        }
    };
    match status {
        Ok(status) => exit_code(status),
        Err(e) => {
            tracing::warn!("failed to wait for task process: {e}");
            -1
        }
    }
}

/// Signal deaths map to `128 + signal` the way shells report them.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

struct ChildControl {
    pid: Option<u32>,
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl ExecutionControl for ChildControl {
    #[cfg(unix)]
    async fn interrupt(&self) -> anyhow::Result<()> {
        let Some(pid) = self.pid else {
            anyhow::bail!("process already exited");
        };
        // Negative pid: the whole process group.
        let rc = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGINT) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn interrupt(&self) -> anyhow::Result<()> {
        anyhow::bail!("interrupting processes is not supported on this platform")
    }

    async fn terminate(&self) -> anyhow::Result<()> {
        match self.kill_tx.lock().take() {
            Some(tx) => {
                let _ = tx.send(());
                Ok(())
            }
            None => anyhow::bail!("terminate already requested"),
        }
    }
}
