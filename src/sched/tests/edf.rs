//! Testes da política EDF: admissão, dispatch e reservas

#![cfg(test)]

use std::sync::Arc;

use super::{kernel_edf, spawn_edf, MockPlatform};
use crate::core::smp::topology::CpuMask;
use crate::core::Kernel;
use crate::sched::core::policy::{PolicyKind, SchedConfig};
use crate::sched::policy::edf::{EdfConfig, DEADLINE_INTERVAL_US};
use crate::sched::task::state::TaskState;
use crate::sched::task::{EdfParams, Task, TaskId};
use crate::sys::Errno;

fn edf_task(id: u32, cpu: u32, period_us: u64, slice_us: u64) -> Arc<Task> {
    Arc::new(Task::new_edf(
        TaskId(id),
        "edf_task",
        cpu,
        EdfParams {
            period_us,
            slice_us,
        },
    ))
}

#[test]
fn test_admission_accumulates_utilization() {
    let kernel = kernel_edf(1);

    // 50% + 50% = exatamente o teto
    let a = edf_task(1, 0, 100_000, 50_000);
    let b = edf_task(2, 0, 100_000, 50_000);
    kernel.edf_sched_admit(&a).unwrap();
    kernel.edf_sched_admit(&b).unwrap();
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(100));

    // Qualquer reserva adicional estoura
    let c = edf_task(3, 0, 100_000, 10_000);
    assert_eq!(kernel.edf_sched_admit(&c), Err(Errno::ERSV));
    assert!(!c.edf_admitted());
}

#[test]
fn test_admission_rejects_overcommitted_period() {
    let kernel = kernel_edf(1);

    // slice 10ms / período 20ms cabe; mais 15ms no mesmo período não
    let a = edf_task(1, 0, 20_000, 10_000);
    kernel.edf_sched_admit(&a).unwrap();

    let b = edf_task(2, 0, 20_000, 15_000);
    assert_eq!(kernel.edf_sched_admit(&b), Err(Errno::ERSV));
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(50));
}

#[test]
fn test_admission_validates_bounds() {
    let kernel = kernel_edf(1);

    // Slice maior que o período
    let a = edf_task(1, 0, 10_000, 20_000);
    assert_eq!(kernel.edf_sched_admit(&a), Err(Errno::EINVAL));

    // Slice abaixo do mínimo configurado
    let b = edf_task(2, 0, 10_000, 500);
    assert_eq!(kernel.edf_sched_admit(&b), Err(Errno::EINVAL));

    // Período acima do máximo
    let c = edf_task(3, 0, 2_000_000_000, 1_000);
    assert_eq!(kernel.edf_sched_admit(&c), Err(Errno::EINVAL));

    // Nada foi reservado
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(0));
}

#[test]
fn test_admission_rejects_zero_period_and_slice() {
    // Limites mínimos em zero não deixam passar parâmetros nulos
    let platform = MockPlatform::new();
    platform.set_cpu(0);
    let config = SchedConfig {
        policy: PolicyKind::Deadline,
        edf: EdfConfig {
            min_slice_us: 0,
            min_period_us: 0,
            ..EdfConfig::default()
        },
    };
    let kernel = Kernel::new(platform, CpuMask::first_n(1), config);

    let a = edf_task(1, 0, 0, 0);
    assert_eq!(kernel.edf_sched_admit(&a), Err(Errno::EINVAL));
    let b = edf_task(2, 0, 10_000, 0);
    assert_eq!(kernel.edf_sched_admit(&b), Err(Errno::EINVAL));
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(0));
}

#[test]
fn test_admission_is_precondition_of_enqueue() {
    let kernel = kernel_edf(1);
    let a = edf_task(1, 0, 100_000, 10_000);
    assert_eq!(kernel.sched_add_task(a.clone()), Err(Errno::EINVAL));

    kernel.edf_sched_admit(&a).unwrap();
    kernel.sched_add_task(a.clone()).unwrap();

    // Admitir duas vezes não é permitido
    assert_eq!(kernel.edf_sched_admit(&a), Err(Errno::EBUSY));
}

#[test]
fn test_del_task_returns_reservation() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 30_000);
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(30));

    assert!(kernel.sched_del_task(&a));
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(0));
    assert!(!a.edf_admitted());
}

#[test]
fn test_picks_earliest_deadline() {
    let kernel = kernel_edf(1);
    let _a = spawn_edf(&kernel, 1, 0, 100_000, 10_000);
    let b = spawn_edf(&kernel, 2, 0, 50_000, 10_000);

    // B tem o período mais curto, logo o deadline mais próximo
    kernel.schedule();
    assert_eq!(kernel.current_task().id(), b.id());
}

#[test]
fn test_equal_deadlines_break_by_lowest_id() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 10_000);
    let _b = spawn_edf(&kernel, 2, 0, 100_000, 10_000);

    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());
}

#[test]
fn test_budget_exhaustion_yields_cpu() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 10_000);
    let b = spawn_edf(&kernel, 2, 0, 200_000, 20_000);

    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());

    // A consumiu o slice inteiro: só volta no próximo período
    kernel.platform().advance_us(10_000);
    kernel.schedule();
    assert_eq!(kernel.current_task().id(), b.id());
}

#[test]
fn test_new_period_refreshes_budget() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 50_000, 10_000);

    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());

    // Orçamento esgotado, nada mais a executar
    kernel.platform().advance_us(10_000);
    kernel.schedule();
    assert!(kernel.current_task().is_idle());

    // Passado o deadline, A começa um período novo com orçamento cheio
    kernel.platform().advance_us(45_000);
    kernel.schedule();
    assert_eq!(kernel.current_task().id(), a.id());
}

#[test]
fn test_remap_rejected_when_target_is_full() {
    let kernel = kernel_edf(2);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 60_000);
    kernel.platform().set_cpu(1);
    let _b = spawn_edf(&kernel, 2, 1, 100_000, 60_000);
    kernel.platform().set_cpu(0);

    // 60% + 60% não cabem na CPU 1; A fica onde está
    assert_eq!(kernel.edf_sched_remap(&a, 1), Err(Errno::ERSV));
    assert_eq!(a.target_cpu(), 0);
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(60));
    assert_eq!(kernel.runqueues.get(1).lock().edf_utilization(), Some(60));
}

#[test]
fn test_remap_moves_reservation_and_task() {
    let kernel = kernel_edf(2);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 30_000);

    kernel.edf_sched_remap(&a, 1).unwrap();
    // Reserva garantida no destino antes da migração acontecer
    assert_eq!(kernel.runqueues.get(1).lock().edf_utilization(), Some(30));
    assert_eq!(a.target_cpu(), 1);

    // O dispatch da CPU 0 desvia a task e devolve a reserva local
    kernel.schedule();
    assert_eq!(a.cpu(), 1);
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(0));
    assert_eq!(kernel.runqueues.get(1).lock().edf_utilization(), Some(30));
    assert_eq!(kernel.runqueues.get(1).lock().len(), 1);
}

#[test]
fn test_adjust_reservation_swaps_utilization() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 30_000);

    kernel
        .edf_adjust_reservation(
            &a,
            EdfParams {
                period_us: 100_000,
                slice_us: 50_000,
            },
        )
        .unwrap();
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(50));
    assert_eq!(
        a.edf_params().unwrap(),
        EdfParams {
            period_us: 100_000,
            slice_us: 50_000,
        }
    );
}

#[test]
fn test_adjust_reservation_failure_restores_old() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 100_000, 30_000);
    let _b = spawn_edf(&kernel, 2, 0, 100_000, 60_000);

    // 80% + 60% não cabem; a reserva antiga de A volta intacta
    let result = kernel.edf_adjust_reservation(
        &a,
        EdfParams {
            period_us: 100_000,
            slice_us: 80_000,
        },
    );
    assert_eq!(result, Err(Errno::ERSV));
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(90));
    assert_eq!(
        a.edf_params().unwrap(),
        EdfParams {
            period_us: 100_000,
            slice_us: 30_000,
        }
    );
    assert_eq!(kernel.runqueues.get(0).lock().len(), 2);
}

#[test]
fn test_missed_deadlines_accumulate_while_unserved() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 50_000, 10_000);

    // Bloqueada: cada período expira sem que o slice seja servido
    a.set_state(TaskState::Interruptible);
    for _ in 0..3 {
        kernel.platform().advance_us(50_000);
        kernel.schedule();
    }
    let rq = kernel.runqueues.get(0).lock();
    assert_eq!(rq.edf_deadline_misses(a.id()), Some(3));
    assert_eq!(rq.edf_periods_in_window(a.id()), Some(3));
}

#[test]
fn test_miss_report_window_resets_counters() {
    let kernel = kernel_edf(1);
    let a = spawn_edf(&kernel, 1, 0, 50_000, 10_000);

    a.set_state(TaskState::Interruptible);
    kernel.platform().advance_us(50_000);
    kernel.schedule();
    assert_eq!(
        kernel.runqueues.get(0).lock().edf_deadline_misses(a.id()),
        Some(1)
    );

    // Fechada a janela de dez segundos, o relatório zera os contadores
    kernel.platform().advance_us(DEADLINE_INTERVAL_US);
    kernel.schedule();
    let rq = kernel.runqueues.get(0).lock();
    assert_eq!(rq.edf_deadline_misses(a.id()), Some(0));
    assert_eq!(rq.edf_periods_in_window(a.id()), Some(0));
}

#[test]
fn test_cpu_remove_drops_oversized_reservations() {
    let kernel = kernel_edf(2);
    let _a = spawn_edf(&kernel, 1, 0, 100_000, 60_000);
    kernel.platform().set_cpu(1);
    let b = spawn_edf(&kernel, 2, 1, 100_000, 60_000);
    kernel.platform().set_cpu(0);

    // B não cabe na CPU 0 junto com A: sai do escalonamento
    kernel.sched_cpu_remove(1, 0).unwrap();
    assert!(!b.edf_admitted());
    assert_eq!(kernel.runqueues.get(0).lock().edf_utilization(), Some(60));
    assert_eq!(kernel.runqueues.get(0).lock().len(), 1);
}
