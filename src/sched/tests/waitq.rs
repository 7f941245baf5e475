//! Testes das filas de espera

#![cfg(test)]

use std::sync::atomic::{AtomicBool, Ordering};

use super::{kernel_rr, spawn_rr};
use crate::core::smp::ipi::IpiVector;
use crate::sched::sync::WaitQueue;
use crate::sched::task::state::TaskState;

#[test]
fn test_prepare_blocks_and_wakeup_readies() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);
    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());

    let wq = WaitQueue::new();
    wq.prepare_to_wait(&kernel, &a, TaskState::Interruptible);
    assert_eq!(a.state(), TaskState::Interruptible);
    assert_eq!(wq.waiters(), 1);

    kernel.schedule();
    assert!(kernel.current_task().is_idle());

    assert_eq!(wq.wakeup(&kernel), 1);
    assert_eq!(a.state(), TaskState::Ready);
    // A entrada continua na fila até a própria task encerrar a espera
    assert_eq!(wq.waiters(), 1);
    assert!(kernel.cpus.get(0).need_resched());

    kernel.irq_exit_check();
    assert_eq!(kernel.current_task().id(), a.id());

    wq.finish_wait(&kernel, &a);
    assert_eq!(wq.waiters(), 0);
}

#[test]
fn test_wakeup_on_empty_queue_is_noop() {
    let kernel = kernel_rr(1);
    let wq = WaitQueue::new();
    assert_eq!(wq.wakeup(&kernel), 0);
    assert!(kernel.platform().take_ipis().is_empty());
}

#[test]
fn test_wakeup_sends_one_ipi_per_cpu() {
    let kernel = kernel_rr(2);
    kernel.platform().set_cpu(1);
    let a = spawn_rr(&kernel, 1, "a", 1);
    let b = spawn_rr(&kernel, 2, "b", 1);

    let wq = WaitQueue::new();
    wq.prepare_to_wait(&kernel, &a, TaskState::Uninterruptible);
    wq.prepare_to_wait(&kernel, &b, TaskState::Uninterruptible);

    // O wakeup parte da CPU 0; as duas acordadas residem na CPU 1
    kernel.platform().set_cpu(0);
    kernel.platform().take_ipis();
    assert_eq!(wq.wakeup(&kernel), 2);
    assert_eq!(
        kernel.platform().take_ipis(),
        vec![(1, IpiVector::Reschedule)]
    );
}

#[test]
fn test_prepare_is_idempotent() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);

    let wq = WaitQueue::new();
    wq.prepare_to_wait(&kernel, &a, TaskState::Interruptible);
    wq.prepare_to_wait(&kernel, &a, TaskState::Interruptible);
    assert_eq!(wq.waiters(), 1);
}

#[test]
fn test_finish_wait_restores_running() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);
    kernel.schedule();

    let wq = WaitQueue::new();
    wq.prepare_to_wait(&kernel, &a, TaskState::Interruptible);
    wq.finish_wait(&kernel, &a);
    assert_eq!(a.state(), TaskState::Running);
    assert_eq!(wq.waiters(), 0);
}

#[test]
fn test_wait_event_with_condition_already_true() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);
    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());

    let wq = WaitQueue::new();
    let flag = AtomicBool::new(true);
    wq.wait_event(&kernel, || flag.load(Ordering::SeqCst));

    // Condição satisfeita de cara: nenhum bloqueio fica para trás
    assert_eq!(a.state(), TaskState::Running);
    assert_eq!(wq.waiters(), 0);
    assert_eq!(kernel.current_task().id(), a.id());
}

#[test]
fn test_stale_wakeup_does_not_disturb_ready_task() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);

    let wq = WaitQueue::new();
    wq.prepare_to_wait(&kernel, &a, TaskState::Interruptible);

    // A task acordou por outra via antes do wakeup da fila
    a.set_state(TaskState::Ready);
    assert_eq!(wq.wakeup(&kernel), 0);
    assert_eq!(a.state(), TaskState::Ready);
    assert_eq!(wq.waiters(), 1);
}

#[test]
fn test_wakeup_keeps_unblocked_entries_linked() {
    let kernel = kernel_rr(1);
    let a = spawn_rr(&kernel, 1, "a", 0);

    // Registrada mas ainda não bloqueada: o wakeup passa por ela sem
    // removê-la da fila
    let wq = WaitQueue::new();
    wq.add_entry(&a);
    assert_eq!(wq.wakeup(&kernel), 0);
    assert_eq!(wq.waiters(), 1);

    // Quando a task finalmente bloqueia, o wakeup seguinte a alcança
    a.set_state(TaskState::Interruptible);
    assert_eq!(wq.wakeup(&kernel), 1);
    assert_eq!(a.state(), TaskState::Ready);
    assert_eq!(wq.waiters(), 1);

    wq.remove_entry(&a);
    assert_eq!(wq.waiters(), 0);
}
