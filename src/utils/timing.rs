// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIMING UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para medir tempo das chamadas ao modelo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::{Duration, Instant};

/// Timer para medir duração de operações
pub struct ActionTimer {
    start: Instant,
    action_name: String,
}

impl ActionTimer {
    /// Inicia um novo timer para uma ação
    pub fn start(action_name: &str) -> Self {
        Self {
            start: Instant::now(),
            action_name: action_name.to_string(),
        }
    }

    /// Retorna o tempo decorrido em milissegundos
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Retorna o tempo decorrido como Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Para o timer e loga o tempo decorrido
    pub fn stop_and_log(self) -> u128 {
        let elapsed = self.elapsed_ms();
        log::info!("⏱️  {} completado em {}ms", self.action_name, elapsed);
        elapsed
    }

    /// Para o timer e retorna o tempo sem logar
    pub fn stop(self) -> u128 {
        self.elapsed_ms()
    }
}

/// Estatísticas de tempo das chamadas de uma sessão
#[derive(Debug, Clone, Default)]
pub struct TimingStats {
    /// Chamadas bem-sucedidas (ms)
    pub call_times: Vec<u128>,
    /// Chamadas que falharam
    pub failures: usize,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma chamada concluída
    pub fn add_call_time(&mut self, ms: u128) {
        self.call_times.push(ms);
    }

    /// Registra uma chamada com erro
    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Média das chamadas bem-sucedidas
    pub fn avg_call_time(&self) -> f64 {
        if self.call_times.is_empty() {
            0.0
        } else {
            self.total_time() as f64 / self.call_times.len() as f64
        }
    }

    /// Retorna tempo total
    pub fn total_time(&self) -> u128 {
        self.call_times.iter().sum()
    }

    /// Formata um resumo das estatísticas
    pub fn summary(&self) -> String {
        format!(
            "Timing Stats: {} calls, avg {:.1}ms, total {}ms, {} failures",
            self.call_times.len(),
            self.avg_call_time(),
            self.total_time(),
            self.failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_action_timer() {
        let timer = ActionTimer::start("test");
        sleep(Duration::from_millis(10));
        let elapsed = timer.stop();
        assert!(elapsed >= 10);
    }

    #[test]
    fn test_timing_stats() {
        let mut stats = TimingStats::new();
        stats.add_call_time(100);
        stats.add_call_time(200);
        stats.add_failure();

        assert_eq!(stats.avg_call_time(), 150.0);
        assert_eq!(stats.total_time(), 300);
        assert!(stats.summary().contains("1 failures"));
    }
}
