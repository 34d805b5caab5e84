// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SSE - Decodificação de Server-Sent Events do lado do cliente
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use futures::stream::{self, StreamExt};
use std::collections::VecDeque;

use super::{LlmError, TextStream};

/// Decodificador incremental de linhas `data:`.
///
/// Acumula bytes até cada `\n`; sequências UTF-8 cortadas entre chunks
/// ficam no buffer até a linha fechar.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alimenta um chunk e devolve os payloads `data:` completos.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = parse_data_line(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Processa o que sobrou no buffer quando o stream termina sem `\n` final.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        parse_data_line(&rest).into_iter().collect()
    }
}

fn parse_data_line(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    (!data.is_empty()).then(|| data.to_string())
}

/// Converte uma resposta HTTP em SSE num stream de fragmentos de texto.
///
/// `parse` recebe cada payload `data:` e devolve `None` para eventos sem
/// texto (keep-alive, `[DONE]`, metadados).
pub(crate) fn text_stream(
    response: reqwest::Response,
    parse: fn(&str) -> Option<Result<String, LlmError>>,
) -> TextStream {
    struct State<S> {
        bytes: S,
        decoder: SseDecoder,
        pending: VecDeque<Result<String, LlmError>>,
        done: bool,
    }

    let state = State {
        bytes: response.bytes_stream().boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    let stream = stream::unfold(state, move |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for data in state.decoder.push(&chunk) {
                        state.pending.extend(parse(&data));
                    }
                }
                Some(Err(e)) => {
                    state.pending.push_back(Err(LlmError::NetworkError(e.to_string())));
                    state.done = true;
                }
                None => {
                    for data in state.decoder.finish() {
                        state.pending.extend(parse(&data));
                    }
                    state.done = true;
                }
            }
        }
    });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_splits_lines() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: {\"a\":1}\n\ndata: [DONE]\n");
        assert_eq!(out, vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn test_decoder_buffers_partial_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: par").is_empty());
        assert_eq!(decoder.push(b"cial\r\n"), vec!["parcial"]);
    }

    #[test]
    fn test_decoder_handles_split_utf8() {
        let bytes = "data: 你好\n".as_bytes();
        let mut decoder = SseDecoder::new();
        // Corta no meio do primeiro caractere chinês
        assert!(decoder.push(&bytes[..7]).is_empty());
        assert_eq!(decoder.push(&bytes[7..]), vec!["你好"]);
    }

    #[test]
    fn test_decoder_ignores_other_fields() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"event: ping\n: comentario\nid: 3\ndata: x\n");
        assert_eq!(out, vec!["x"]);
    }

    #[test]
    fn test_decoder_finish_flushes_tail() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: fim").is_empty());
        assert_eq!(decoder.finish(), vec!["fim"]);
        assert!(decoder.finish().is_empty());
    }
}
