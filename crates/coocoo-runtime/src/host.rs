//! Native host: executes a compiled module on wasmi against an image store.

use std::mem;

use coocoo_types::{CompiledModule, Intrinsic, IMPORT_MODULE};
use wasmi::{Caller, Engine, Linker, Module, Store};

use crate::error::{RuntimeError, RuntimeResult};
use crate::export::{collect, ExportedImages};
use crate::intrinsics::dispatch;
use crate::store::ImageStore;

/// Owns the image store across compile/run cycles.
#[derive(Debug, Default)]
pub struct Session {
    store: ImageStore,
    engine: Engine,
}

impl Session {
    pub fn new(store: ImageStore) -> Self {
        Self {
            store,
            engine: Engine::default(),
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ImageStore {
        &mut self.store
    }

    pub fn into_store(self) -> ImageStore {
        self.store
    }

    /// Run `main` of `module` and collect its outputs.
    ///
    /// Intrinsic results stay in the store afterwards; call
    /// [`ImageStore::clear_generated`] or [`ImageStore::reset`] between runs.
    #[tracing::instrument(skip(self, module), fields(sha256 = %module.wasm_sha256))]
    pub fn run(&mut self, module: &CompiledModule) -> RuntimeResult<ExportedImages> {
        let wasm_module = Module::new(&self.engine, &module.wasm[..]).map_err(host_error)?;
        let linker = link(&self.engine)?;

        let mut store = Store::new(&self.engine, mem::take(&mut self.store));
        let result = execute(&linker, &mut store, &wasm_module, module);
        self.store = store.into_data();

        if let Ok(exported) = &result {
            tracing::debug!(
                images = self.store.len(),
                categories = exported.len(),
                "module finished"
            );
        }
        result
    }
}

fn execute(
    linker: &Linker<ImageStore>,
    store: &mut Store<ImageStore>,
    wasm_module: &Module,
    module: &CompiledModule,
) -> RuntimeResult<ExportedImages> {
    let instance = linker
        .instantiate(&mut *store, wasm_module)
        .map_err(host_error)?
        .start(&mut *store)
        .map_err(host_error)?;
    let main = instance
        .get_typed_func::<(), ()>(&*store, "main")
        .map_err(host_error)?;
    main.call(&mut *store, ()).map_err(host_error)?;

    let memory = instance
        .get_memory(&*store, "memory")
        .ok_or_else(|| RuntimeError::Host("module does not export its memory".to_string()))?;
    Ok(collect(store.data(), module, memory.data(&*store)))
}

/// Link every intrinsic under [`IMPORT_MODULE`].
fn link(engine: &Engine) -> RuntimeResult<Linker<ImageStore>> {
    let mut linker = Linker::<ImageStore>::new(engine);
    for intrinsic in Intrinsic::ALL {
        let name = intrinsic.name();
        let linked = match intrinsic.arity() {
            1 => linker.func_wrap(
                IMPORT_MODULE,
                name,
                move |mut c: Caller<'_, ImageStore>, a: i32| -> i32 {
                    dispatch(c.data_mut(), intrinsic, &[a])
                },
            ),
            2 => linker.func_wrap(
                IMPORT_MODULE,
                name,
                move |mut c: Caller<'_, ImageStore>, a: i32, b: i32| -> i32 {
                    dispatch(c.data_mut(), intrinsic, &[a, b])
                },
            ),
            3 => linker.func_wrap(
                IMPORT_MODULE,
                name,
                move |mut c: Caller<'_, ImageStore>, a: i32, b: i32, d: i32| -> i32 {
                    dispatch(c.data_mut(), intrinsic, &[a, b, d])
                },
            ),
            6 => linker.func_wrap(
                IMPORT_MODULE,
                name,
                move |mut c: Caller<'_, ImageStore>,
                      r: i32,
                      g: i32,
                      b: i32,
                      a: i32,
                      w: i32,
                      h: i32|
                      -> i32 { dispatch(c.data_mut(), intrinsic, &[r, g, b, a, w, h]) },
            ),
            n => {
                return Err(RuntimeError::Host(format!(
                    "no host signature for {intrinsic} with {n} parameters"
                )))
            }
        };
        linked.map_err(host_error)?;
    }
    Ok(linker)
}

fn host_error(error: impl std::fmt::Display) -> RuntimeError {
    RuntimeError::Host(error.to_string())
}
