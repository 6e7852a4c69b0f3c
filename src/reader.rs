use crate::buffer::{BufferPool, Record, RecordQueue};
use crate::format::{StreamTag, Timestamp};
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Spawn thread that drains one child pipe line by line.
///
/// Each line (trailing newline included, or a final partial line at
/// pipe close) is stamped at the moment it is observed and pushed to
/// the shared queue. Two of these run concurrently, one per pipe, so
/// an idle stream never stalls delivery from the busy one.
///
/// A read error is treated as end-of-stream for this pipe: the child
/// may still be running and the other pipe must keep draining.
pub fn spawn_stream_reader<R>(
    stream: StreamTag,
    pipe: R,
    pool: &Arc<BufferPool>,
    queue: &Arc<RecordQueue>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    let pool = Arc::clone(pool);
    let queue = Arc::clone(queue);

    thread::spawn(move || {
        let mut pipe_reader = BufReader::new(pipe);

        loop {
            let mut line = pool.alloc();

            match pipe_reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }

            queue.push(Record {
                stream,
                stamp: Timestamp::now(),
                line,
            });
        }

        queue.producer_done();
    })
}
