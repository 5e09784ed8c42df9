//! End-to-end lifecycle scenarios over the in-memory store.

use std::sync::Arc;

use anyhow::Result;
use opsdesk_app::{Completion, Session, TaskError, TaskManager};
use opsdesk_core::{
    ClientId, NewClient, NewTask, Priority, Recurrence, TaskPatch, TaskStatus, UserId,
};
use opsdesk_store_mem::MemStore;
use time::macros::date;

fn seeded() -> Result<(Arc<MemStore>, Session, ClientId)> {
    let store = Arc::new(MemStore::new());
    let session = Session::new(UserId::new());
    let client = store.insert_client(session.user, NewClient::new("Acme"))?;
    Ok((store, session, client.id))
}

/// Let spawned background writes run to completion.
async fn drain_background() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn completing_a_weekly_task_chains_a_successor() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session).await?;

    let mut new = NewTask::new(client, "Weekly status report");
    new.due_date = Some(date!(2024 - 03 - 01));
    new.recurrence = Recurrence::Weekly;
    let original = tasks.add(new).await?;

    let successor = match tasks.complete(original.id).await? {
        Completion::Recurred { successor } => successor,
        other => anyhow::bail!("expected a successor, got {other:?}"),
    };
    assert_eq!(successor.due_date, Some(date!(2024 - 03 - 08)));
    assert_eq!(successor.parent_task_id, Some(original.id));
    assert_eq!(successor.recurrence, Recurrence::Weekly);
    assert_eq!(successor.title, original.title);
    assert!(!successor.done);

    // Every later link still points at the first task of the chain.
    let third = match tasks.complete(successor.id).await? {
        Completion::Recurred { successor } => successor,
        other => anyhow::bail!("expected a successor, got {other:?}"),
    };
    assert_eq!(third.parent_task_id, Some(original.id));
    assert_eq!(third.due_date, Some(date!(2024 - 03 - 15)));

    // The store agrees with the local snapshot.
    let rows = store.list_tasks(session.user)?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|t| t.done).count(), 2);
    Ok(())
}

#[tokio::test]
async fn recurring_task_without_a_due_date_never_advances() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(store, session).await?;

    let mut new = NewTask::new(client, "Inbox sweep");
    new.recurrence = Recurrence::Daily;
    let task = tasks.add(new).await?;

    assert!(matches!(tasks.complete(task.id).await?, Completion::Done));
    assert_eq!(tasks.tasks().len(), 1);
    Ok(())
}

#[tokio::test]
async fn pending_order_puts_overdue_work_first() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(store, session).await?;
    let today = date!(2024 - 03 - 01);

    let mut low_overdue = NewTask::new(client, "late low");
    low_overdue.due_date = Some(date!(2024 - 02 - 20));
    low_overdue.priority = Priority::Low;
    let mut high_future = NewTask::new(client, "future high");
    high_future.due_date = Some(date!(2024 - 03 - 05));
    high_future.priority = Priority::High;
    let undated = NewTask::new(client, "undated");
    for new in [undated, high_future, low_overdue] {
        tasks.add(new).await?;
    }

    let order: Vec<String> = tasks
        .pending_sorted(today)
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(order, ["late low", "future high", "undated"]);
    assert_eq!(
        tasks.next_up(today).map(|t| t.title.as_str()),
        Some("late low")
    );
    Ok(())
}

#[tokio::test]
async fn status_changes_on_a_completed_task_leave_completion_alone() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session).await?;
    let task = tasks.add(NewTask::new(client, "Ship deck")).await?;

    assert!(matches!(tasks.complete(task.id).await?, Completion::Done));
    let completed_at = tasks.get(task.id).and_then(|t| t.completed_at);
    assert!(completed_at.is_some());

    tasks.set_status(task.id, TaskStatus::Blocked);
    drain_background().await;

    let local = tasks.get(task.id).map(|t| (t.done, t.completed_at, t.status));
    assert_eq!(local, Some((true, completed_at, TaskStatus::Blocked)));
    let rows = store.list_tasks(session.user)?;
    assert!(rows[0].done);
    assert_eq!(rows[0].status, TaskStatus::Blocked);
    Ok(())
}

#[tokio::test]
async fn uncomplete_reverts_once_and_keeps_the_successor() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session).await?;

    let mut new = NewTask::new(client, "Monthly invoice");
    new.due_date = Some(date!(2024 - 01 - 31));
    new.recurrence = Recurrence::Monthly;
    let task = tasks.add(new).await?;
    assert!(matches!(
        tasks.complete(task.id).await?,
        Completion::Recurred { .. }
    ));

    tasks.uncomplete(task.id);
    // A second revert on an already-pending task changes nothing.
    tasks.uncomplete(task.id);
    drain_background().await;

    let local = tasks.get(task.id).map(|t| (t.done, t.completed_at));
    assert_eq!(local, Some((false, None)));
    // The generated successor is not retracted.
    assert_eq!(tasks.tasks().len(), 2);
    let rows = store.list_tasks(session.user)?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|t| !t.done));
    Ok(())
}

#[tokio::test]
async fn failed_background_write_diverges_until_reload() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session)
        .await?
        .with_write_failure_hook(Arc::new(|_op, _err| {}));
    let task = tasks.add(NewTask::new(client, "Draft")).await?;

    store.fail_once("update_task");
    tasks.update(
        task.id,
        TaskPatch {
            title: Some("Draft v2".to_owned()),
            ..TaskPatch::default()
        },
    );
    drain_background().await;

    // Accepted divergence: local view ahead of the store.
    assert_eq!(tasks.get(task.id).map(|t| t.title.as_str()), Some("Draft v2"));
    let rows = store.list_tasks(session.user)?;
    assert_eq!(rows[0].title, "Draft");

    // The next reload restores the authoritative state.
    tasks.reload().await?;
    assert_eq!(tasks.get(task.id).map(|t| t.title.as_str()), Some("Draft"));
    Ok(())
}

#[tokio::test]
async fn lost_successor_is_reported_not_swallowed() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session).await?;

    let mut new = NewTask::new(client, "Weekly status report");
    new.due_date = Some(date!(2024 - 03 - 01));
    new.recurrence = Recurrence::Weekly;
    let task = tasks.add(new).await?;

    store.fail_once("insert_task");
    let err = match tasks.complete(task.id).await {
        Err(err) => err,
        Ok(outcome) => anyhow::bail!("expected a lost successor, got {outcome:?}"),
    };
    assert!(matches!(
        err,
        TaskError::SuccessorLost { completed, .. } if completed == task.id
    ));

    // The completion itself landed; only the successor is missing.
    let rows = store.list_tasks(session.user)?;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].done);
    assert_eq!(tasks.tasks().len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_completion_write_is_surfaced_immediately() -> Result<()> {
    let (store, session, client) = seeded()?;
    let mut tasks = TaskManager::load(Arc::clone(&store), session).await?;
    let task = tasks.add(NewTask::new(client, "Ship deck")).await?;

    store.fail_once("set_task_done");
    assert!(matches!(
        tasks.complete(task.id).await,
        Err(TaskError::Store(_))
    ));
    // The optimistic flip stands locally; the store row is untouched.
    assert_eq!(tasks.get(task.id).map(|t| t.done), Some(true));
    let rows = store.list_tasks(session.user)?;
    assert!(!rows[0].done);
    Ok(())
}
