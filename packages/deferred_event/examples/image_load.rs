//! Awaiting a one-time "load" event instead of nesting callbacks.
//!
//! An image loader signals completion through an event. The rendering task awaits that signal
//! while other work keeps running on the same single-threaded run-loop.

use std::rc::Rc;

use deferred_event::{LocalEmitter, once_local_scoped};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

#[derive(Clone, Debug)]
struct Target {
    src: String,
}

#[derive(Clone, Debug)]
struct LoadEvent {
    target: Target,
}

fn main() {
    let image = Rc::new(
        LocalEmitter::<LoadEvent>::builder()
            .name("image")
            .build(),
    );

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    spawner
        .spawn_local({
            let image = Rc::clone(&image);
            async move {
                println!("waiting for the image to load");

                let event = once_local_scoped(&*image, "load").await;

                println!("image loaded from {}", event.target.src);
            }
        })
        .expect("run-loop has shut down");

    spawner
        .spawn_local({
            let image = Rc::clone(&image);
            async move {
                println!("loader finished, signaling");

                image.emit(
                    "load",
                    &LoadEvent {
                        target: Target {
                            src: "a.png".to_string(),
                        },
                    },
                );
            }
        })
        .expect("run-loop has shut down");

    pool.run();

    println!(
        "listeners left on the image: {}",
        image.listener_count("load")
    );
}
